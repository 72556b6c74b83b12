//! Physical acquisition parameters found in plane records.
//!
//! Camera settings are written with the camera's device label as a prefix
//! (`Camera-Gain`, `HamamatsuHam_DCAM-Binning`, ...). The label is bound by
//! the `Core-Camera` entry, so a key is matched by stripping the currently
//! bound label and looking the remaining suffix up once.

use log::{debug, warn};

use super::builder::{parse_or_warn, ParseContext, PositionBuilder};

/// Camera property suffixes the parser understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraField {
    Binning,
    CameraId,
    CameraName,
    Gain,
    Name,
    Temperature,
    CcdMode,
    Exposure,
}

impl CameraField {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "Binning" => Some(CameraField::Binning),
            "CameraID" => Some(CameraField::CameraId),
            "CameraName" => Some(CameraField::CameraName),
            "Gain" => Some(CameraField::Gain),
            "Name" => Some(CameraField::Name),
            "Temperature" => Some(CameraField::Temperature),
            "CCDMode" => Some(CameraField::CcdMode),
            "Exposure" => Some(CameraField::Exposure),
            _ => None,
        }
    }
}

/// Resolves `{camera}-{suffix}` against the bound camera label.
pub fn camera_field(key: &str, camera: Option<&str>) -> Option<CameraField> {
    let suffix = key.strip_prefix(camera?)?.strip_prefix('-')?;
    CameraField::from_suffix(suffix)
}

/// Applies the per-plane physical keys shared by both dialects: exposure,
/// elapsed time, camera binding and camera settings, DAC voltages and the
/// plane's file name.
pub(crate) fn apply_plane_key(
    builder: &mut PositionBuilder,
    ctx: &mut ParseContext,
    key: &str,
    value: &str,
) {
    match key {
        "Exposure-ms" => {
            if let Some(ms) = parse_or_warn::<f64>(key, value) {
                builder.position_mut().exposure_time = Some(ms / 1000.0);
            }
            return;
        }
        "ElapsedTime-ms" => {
            if let Some(ms) = parse_or_warn::<f64>(key, value) {
                builder.push_timestamp(ms / 1000.0);
            }
            return;
        }
        "Core-Camera" => {
            debug!("binding camera '{value}'");
            ctx.camera_ref = Some(value.to_string());
            return;
        }
        _ => {}
    }

    if let Some(field) = camera_field(key, ctx.camera_ref.as_deref()) {
        apply_camera_field(builder, field, key, value);
    } else if key.starts_with("DAC-") && key.ends_with("-Volts") {
        if let Some(volts) = parse_or_warn::<f64>(key, value) {
            builder.position_mut().voltages.push(volts);
        }
    } else if key == "FileName" {
        builder.register_file(ctx.coord, value);
    }
}

fn apply_camera_field(builder: &mut PositionBuilder, field: CameraField, key: &str, value: &str) {
    let position = builder.position_mut();
    match field {
        CameraField::Binning => position.binning = Some(normalize_binning(value)),
        CameraField::CameraId => position.detector_id = Some(value.to_string()),
        CameraField::CameraName => position.detector_model = Some(value.to_string()),
        CameraField::Gain => position.gain = parse_gain(value),
        CameraField::Name => position.detector_manufacturer = Some(value.to_string()),
        CameraField::Temperature => {
            if let Some(celsius) = parse_or_warn(key, value) {
                position.temperature = celsius;
            }
        }
        CameraField::CcdMode => position.camera_mode = Some(value.to_string()),
        CameraField::Exposure => {
            if let Some(ms) = parse_or_warn::<f64>(key, value) {
                position.exposure_time = Some(ms / 1000.0);
            }
        }
    }
}

/// `"2"` becomes `"2x2"`; values already in `WxH` form are kept.
fn normalize_binning(value: &str) -> String {
    if value.contains('x') {
        value.to_string()
    } else {
        format!("{value}x{value}")
    }
}

/// Gain is stored as an integer; unparsable values become `-1`.
fn parse_gain(value: &str) -> i32 {
    match value.trim().parse::<f64>() {
        Ok(gain) => gain as i32,
        Err(_) => {
            warn!("non-numeric camera gain '{value}', storing -1");
            -1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::coord::PlaneCoord;
    use crate::meta::model::Position;
    use crate::meta::version::Dialect;

    fn setup() -> (PositionBuilder, ParseContext) {
        (
            PositionBuilder::new(Position::new(0, "/acq/metadata.txt")),
            ParseContext::new(Dialect::V1, true),
        )
    }

    #[test]
    fn camera_field_requires_bound_camera() {
        assert_eq!(camera_field("Camera-Gain", None), None);
        assert_eq!(
            camera_field("Camera-Gain", Some("Camera")),
            Some(CameraField::Gain)
        );
        assert_eq!(camera_field("Camera2-Gain", Some("Camera")), None);
        assert_eq!(camera_field("CameraGain", Some("Camera")), None);
        assert_eq!(camera_field("Camera-Offset", Some("Camera")), None);
    }

    #[test]
    fn camera_keys_apply_after_binding() {
        let (mut builder, mut ctx) = setup();
        apply_plane_key(&mut builder, &mut ctx, "Andor-Gain", "300");
        assert_eq!(builder.position_mut().gain, 0);

        apply_plane_key(&mut builder, &mut ctx, "Core-Camera", "Andor");
        apply_plane_key(&mut builder, &mut ctx, "Andor-Gain", "300.7");
        apply_plane_key(&mut builder, &mut ctx, "Andor-Binning", "2");
        apply_plane_key(&mut builder, &mut ctx, "Andor-CameraID", "X-1234");
        apply_plane_key(&mut builder, &mut ctx, "Andor-CameraName", "iXon Ultra");
        apply_plane_key(&mut builder, &mut ctx, "Andor-Name", "Andor");
        apply_plane_key(&mut builder, &mut ctx, "Andor-Temperature", "-70.5");
        apply_plane_key(&mut builder, &mut ctx, "Andor-CCDMode", "EM");

        let position = builder.position_mut();
        assert_eq!(position.gain, 300);
        assert_eq!(position.binning.as_deref(), Some("2x2"));
        assert_eq!(position.detector_id.as_deref(), Some("X-1234"));
        assert_eq!(position.detector_model.as_deref(), Some("iXon Ultra"));
        assert_eq!(position.detector_manufacturer.as_deref(), Some("Andor"));
        assert_eq!(position.temperature, -70.5);
        assert_eq!(position.camera_mode.as_deref(), Some("EM"));
        assert_eq!(ctx.camera_ref.as_deref(), Some("Andor"));
    }

    #[test]
    fn binning_with_separator_is_kept() {
        assert_eq!(normalize_binning("1x2"), "1x2");
        assert_eq!(normalize_binning("4"), "4x4");
    }

    #[test]
    fn non_numeric_gain_is_a_sentinel() {
        let (mut builder, mut ctx) = setup();
        apply_plane_key(&mut builder, &mut ctx, "Core-Camera", "Camera");
        apply_plane_key(&mut builder, &mut ctx, "Camera-Gain", "high");
        assert_eq!(builder.position_mut().gain, -1);
    }

    #[test]
    fn exposures_are_converted_to_seconds() {
        let (mut builder, mut ctx) = setup();
        apply_plane_key(&mut builder, &mut ctx, "Exposure-ms", "100");
        assert_eq!(builder.position_mut().exposure_time, Some(0.1));

        apply_plane_key(&mut builder, &mut ctx, "Core-Camera", "Camera");
        apply_plane_key(&mut builder, &mut ctx, "Camera-Exposure", "250");
        assert_eq!(builder.position_mut().exposure_time, Some(0.25));
    }

    #[test]
    fn voltages_keep_encounter_order() {
        let (mut builder, mut ctx) = setup();
        apply_plane_key(&mut builder, &mut ctx, "DAC-2-Volts", "1.5");
        apply_plane_key(&mut builder, &mut ctx, "DAC-1-Volts", "0.25");
        assert_eq!(builder.position_mut().voltages, vec![1.5, 0.25]);
    }

    #[test]
    fn file_name_registers_context_coordinate() {
        let (mut builder, mut ctx) = setup();
        ctx.coord = PlaneCoord::new(2, 0, 1);
        apply_plane_key(&mut builder, &mut ctx, "FileName", "img_000000001_DAPI_002.tif");
        assert!(builder
            .position_mut()
            .plane_files
            .contains_key(&PlaneCoord::new(2, 0, 1)));
    }
}
