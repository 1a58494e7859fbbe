// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::error::NormalizeError;

/// Input block size for the sinc resampler.
const INPUT_BLOCK_SIZE: usize = 1024;

/// Folds interleaved multi-channel audio into a single channel by averaging each frame.
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels as usize;
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resamples a mono clip from one rate to another with rubato's sinc resampler.
/// The output is trimmed so it lines up with the input: the resampler delay is
/// dropped and the length is `ceil(input_len * target / source)`.
pub fn resample_mono(
    input: &[f32],
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, NormalizeError> {
    if source_rate == target_rate || input.is_empty() {
        return Ok(input.to_vec());
    }

    let failed =
        |_e: rubato::ResampleError| NormalizeError::ResamplingFailed(source_rate, target_rate);

    let sinc_params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        oversampling_factor: 128,
        interpolation: SincInterpolationType::Linear,
        window: WindowFunction::BlackmanHarris2,
    };
    let resample_ratio = target_rate as f64 / source_rate as f64;
    let mut resampler =
        SincFixedIn::<f32>::new(resample_ratio, 1.0, sinc_params, INPUT_BLOCK_SIZE, 1)
            .map_err(|_e| NormalizeError::ResamplingFailed(source_rate, target_rate))?;

    let expected_frames = (input.len() as f64 * resample_ratio).ceil() as usize;
    let delay = resampler.output_delay();
    let mut output_scratch = resampler.output_buffer_allocate(true);
    let mut output = Vec::with_capacity(expected_frames + delay);

    // Full blocks first.
    let mut position = 0;
    while input.len() - position >= resampler.input_frames_next() {
        let needed = resampler.input_frames_next();
        let block = [&input[position..position + needed]];
        let (nbr_in, nbr_out) = resampler
            .process_into_buffer(&block[..], &mut output_scratch, None)
            .map_err(failed)?;
        position += nbr_in;
        output.extend_from_slice(&output_scratch[0][..nbr_out]);
    }

    // Then whatever is left over, zero padded by the resampler.
    if position < input.len() {
        let tail = [&input[position..]];
        let (_nbr_in, nbr_out) = resampler
            .process_partial_into_buffer(Some(&tail[..]), &mut output_scratch, None)
            .map_err(failed)?;
        output.extend_from_slice(&output_scratch[0][..nbr_out]);
    }

    // Flush the filter delay.
    while output.len() < expected_frames + delay {
        let (_nbr_in, nbr_out) = resampler
            .process_partial_into_buffer(None::<&[&[f32]]>, &mut output_scratch, None)
            .map_err(failed)?;
        if nbr_out == 0 {
            break;
        }
        output.extend_from_slice(&output_scratch[0][..nbr_out]);
    }

    Ok(output
        .into_iter()
        .skip(delay)
        .take(expected_frames)
        .collect())
}
