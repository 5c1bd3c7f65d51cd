// WHY: unmatched tokens still need times; gaps are spread linearly towards the next anchor
// The global clamp afterwards is the only place the monotonic-spacing invariant is enforced

use super::{AlignConfig, AlignmentState, Token};

/// Assign a raw time to every unmatched token of a line, left to right
///
/// `prev` is the nearest earlier token time in the line (including ones
/// assigned earlier in this pass) or `line_start_time` for the first token.
/// `steps` counts positions from the unmatched token up to and including the
/// next anchor, and is recomputed independently for every unmatched token.
/// Returns the number of tokens interpolated.
pub fn fill_gaps(tokens: &mut [Token], line_start_time: f64, config: &AlignConfig) -> usize {
    let mut interpolated = 0;
    for k in 0..tokens.len() {
        if tokens[k].time.is_some() {
            continue;
        }

        let prev_time = tokens[..k]
            .iter()
            .rev()
            .find_map(|t| t.time)
            .unwrap_or(line_start_time);

        let next_anchor = tokens[k + 1..]
            .iter()
            .enumerate()
            .find_map(|(offset, t)| t.time.map(|time| (offset + 2, time)));

        let time = match next_anchor {
            Some((steps, next_time)) => {
                let gap = ((next_time - prev_time) / steps as f64).clamp(config.min_duration, config.max_gap);
                prev_time + gap
            }
            None => prev_time + config.max_gap,
        };
        tokens[k].time = Some(time);
        interpolated += 1;
    }
    interpolated
}

/// Enforce `time >= last_valid_time + min_duration` token by token, advancing the running time
///
/// Every token must already carry a time. Returns the clamped time of the first
/// token, the line's effective start.
pub fn clamp_monotonic(tokens: &mut [Token], state: &mut AlignmentState, min_duration: f64) -> Option<f64> {
    let mut effective_start = None;
    for token in tokens.iter_mut() {
        let floor = state.last_valid_time + min_duration;
        let time = token.time.map_or(floor, |t| t.max(floor));
        token.time = Some(time);
        state.last_valid_time = time;
        if effective_start.is_none() {
            effective_start = Some(time);
        }
    }
    effective_start
}
