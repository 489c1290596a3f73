#![allow(dead_code)]

use aisfix::{
    fixes::{
        binary_format::{create_fixes_file, BinaryFixesFormat},
        AisClass, Fix,
    },
    nmea::checksum,
};
use approx::assert_relative_eq;
use camino::{Utf8Path, Utf8PathBuf};
use rand::Rng;

/// `!<body>*hh` with a correct checksum.
pub fn nmea_line(body: &str) -> String {
    format!("!{body}*{:02X}", checksum(body))
}

/// `\<tags>*hh\!<body>*hh` with correct checksums.
pub fn tagged_line(tags: &str, body: &str) -> String {
    format!("\\{tags}*{:02X}\\{}", checksum(tags), nmea_line(body))
}

pub fn utf8_dir(dir: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8Path::from_path(dir.path())
        .expect("temporary directory is UTF-8")
        .to_path_buf()
}

pub fn random_fix<R: Rng>(rng: &mut R, time_range: std::ops::Range<i64>) -> Fix {
    Fix {
        mmsi: Some(rng.random_range(200_000_000..800_000_000)),
        lat: rng.random_range(-90.0..=90.0),
        lon: rng.random_range(-180.0..=180.0),
        time: rng.random_range(time_range),
        navigational_status: None,
        rate_of_turn: None,
        speed_over_ground: Some(rng.random_range(0..1023) as f32 / 10.0),
        course_over_ground: Some(rng.random_range(0..3600) as f32 / 10.0),
        heading: None,
        ais_class: if rng.random_bool(0.5) {
            AisClass::A
        } else {
            AisClass::B
        },
    }
}

pub fn write_fix_file(path: &Utf8Path, fixes: &[Fix], format: BinaryFixesFormat) {
    let mut writer = create_fixes_file(path, format).unwrap();
    for fix in fixes {
        writer.write(fix).unwrap();
    }
    writer.into_inner().unwrap();
}

pub fn assert_position_close(fix: &Fix, lat: f64, lon: f64) {
    assert_relative_eq!(fix.lat as f64, lat, epsilon = 1e-5);
    assert_relative_eq!(fix.lon as f64, lon, epsilon = 1e-5);
}
