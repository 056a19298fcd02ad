//! Still-frame snapshot rendering
//!
//! Draws the current video frame into a lossless PNG, sized to match the
//! frame, ready to be staged as a `data:image/png` form field.

use crate::media::data_url::DataUrl;
use crate::platform::traits::VideoFrame;
use crate::utils::error::{CaptureError, CaptureResult};

/// Encode an RGBA frame as a PNG image
pub fn frame_to_png(frame: &VideoFrame) -> CaptureResult<Vec<u8>> {
    if frame.width == 0 || frame.height == 0 {
        return Err(CaptureError::FrameNotReady);
    }

    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.rgba.len() != expected {
        return Err(CaptureError::Encode(format!(
            "frame buffer holds {} bytes, expected {} for {}x{} RGBA",
            frame.rgba.len(),
            expected,
            frame.width,
            frame.height
        )));
    }

    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, frame.width, frame.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.rgba)?;
    writer.finish()?;

    Ok(out)
}

/// Encode a frame straight into a stageable `data:image/png` URL
pub fn frame_to_data_url(frame: &VideoFrame) -> CaptureResult<DataUrl> {
    let png = frame_to_png(frame)?;
    Ok(DataUrl::encode("image/png", &png))
}
