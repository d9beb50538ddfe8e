//! Visual duration scheduler.
//!
//! Every clip gets an even share of the audio (clamped only when clip
//! bounds are configured); attention clips get a bounded boost on top. The
//! sum rarely equals the audio duration afterwards, so the tail of the
//! sequence is adjusted:
//! a short plan extends its last clip, a long plan is cut at the audio end.
//! Nothing is redistributed across earlier clips.

use crate::config::SyncConfig;
use crate::error::{ensure_duration, Result, SyncError};
use crate::types::{sum_durations, Adjustment, ClipPlan, ClipPlanEntry, ClipRequest, Intent};

/// Duration an attention clip gets for a given base share.
///
/// Capped multiplicatively and additively (and by `max_clip_seconds` when
/// set), and never below `base`.
pub fn attention_duration(base: f64, config: &SyncConfig) -> f64 {
    let mut boosted = (base * config.attention_boost_factor)
        .min(base + config.attention_boost_cap_seconds);
    if let Some(max) = config.max_clip_seconds {
        boosted = boosted.min(max);
    }
    boosted.max(base)
}

/// Even share with the optional clip bounds applied.
fn clamp_share(share: f64, config: &SyncConfig) -> f64 {
    let mut base = share;
    if let Some(min) = config.min_clip_seconds {
        base = base.max(min);
    }
    if let Some(max) = config.max_clip_seconds {
        base = base.min(max);
    }
    base
}

/// Assign durations to `clips` so they add up to `audio_duration` exactly.
pub fn schedule(
    clips: &[ClipRequest],
    audio_duration: f64,
    config: &SyncConfig,
) -> Result<ClipPlan> {
    if clips.is_empty() {
        return Err(SyncError::NoVisualAssets);
    }
    ensure_duration(audio_duration)?;
    config.validate()?;

    let even_share = audio_duration / clips.len() as f64;
    let base = clamp_share(even_share, config);
    if base != even_share {
        log::debug!(
            "Per-clip share {:.3}s clamped to {:.3}s",
            even_share,
            base
        );
    }
    let boosted_duration = attention_duration(base, config);

    let mut entries: Vec<ClipPlanEntry> = clips
        .iter()
        .map(|clip| {
            let boosted = clip.intent == Intent::Attention;
            ClipPlanEntry {
                asset: clip.asset.clone(),
                duration: if boosted { boosted_duration } else { base },
                boosted,
            }
        })
        .collect();

    let requested_total = sum_durations(&entries);
    let adjustment = if is_rounding_error(requested_total, audio_duration) {
        // Float drift from an even split; the last clip absorbs it.
        if let Some((last, head)) = entries.split_last_mut() {
            last.duration = absorb_residual(sum_durations(head), audio_duration);
        }
        Adjustment::Exact
    } else if requested_total < audio_duration {
        extend_last(&mut entries, audio_duration, requested_total)
    } else {
        truncate_at(&mut entries, audio_duration, requested_total)
    };

    log::info!(
        "Scheduled {} of {} clips over {:.3}s (requested {:.3}s, {:?})",
        entries.len(),
        clips.len(),
        audio_duration,
        requested_total,
        adjustment
    );

    Ok(ClipPlan {
        entries,
        requested_total,
        adjustment,
    })
}

/// Schedule `clip_count` anonymous clips; missing intents count as neutral.
///
/// Assets are named `clip_001`, `clip_002`, ...
pub fn schedule_even(
    clip_count: usize,
    audio_duration: f64,
    intents: &[Intent],
    config: &SyncConfig,
) -> Result<ClipPlan> {
    let clips: Vec<ClipRequest> = (0..clip_count)
        .map(|i| {
            let intent = intents.get(i).copied().unwrap_or_default();
            ClipRequest::new(&format!("clip_{:03}", i + 1), intent)
        })
        .collect();
    schedule(&clips, audio_duration, config)
}

fn is_rounding_error(requested: f64, target: f64) -> bool {
    (requested - target).abs() <= f64::EPSILON * 64.0 * target
}

/// Lengthen the last clip by the shortfall.
fn extend_last(entries: &mut [ClipPlanEntry], target: f64, requested: f64) -> Adjustment {
    if let Some((last, head)) = entries.split_last_mut() {
        last.duration = absorb_residual(sum_durations(head), target);
    }
    Adjustment::Extended {
        shortfall: target - requested,
    }
}

/// Cut the sequence at `target`: the clip crossing it is shortened, later
/// clips are dropped.
fn truncate_at(entries: &mut Vec<ClipPlanEntry>, target: f64, requested: f64) -> Adjustment {
    let mut cursor = 0.0;
    let mut keep = entries.len();
    for (i, entry) in entries.iter().enumerate() {
        if cursor + entry.duration >= target {
            keep = i + 1;
            break;
        }
        cursor += entry.duration;
    }

    let dropped = entries.len() - keep;
    entries.truncate(keep);
    if let Some(last) = entries.last_mut() {
        last.duration = absorb_residual(cursor, target);
    }

    Adjustment::Truncated {
        overflow: requested - target,
        dropped,
    }
}

/// Smallest adjustment of `target - prefix` whose float sum with `prefix`
/// lands on `target` exactly.
fn absorb_residual(prefix: f64, target: f64) -> f64 {
    let mut residual = target - prefix;
    for _ in 0..8 {
        let sum = prefix + residual;
        if sum == target {
            break;
        }
        residual = if sum < target {
            step_up(residual)
        } else {
            step_down(residual)
        };
    }
    residual
}

fn step_up(x: f64) -> f64 {
    if x == 0.0 {
        f64::from_bits(1)
    } else if x > 0.0 {
        f64::from_bits(x.to_bits() + 1)
    } else {
        f64::from_bits(x.to_bits() - 1)
    }
}

fn step_down(x: f64) -> f64 {
    -step_up(-x)
}
