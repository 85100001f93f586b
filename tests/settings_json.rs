#![cfg(feature = "serde")]
#![allow(non_snake_case)]

use trajopt::solver::*;

#[test]
fn test_settings_json_round_trip() {
    let settings = DefaultSettingsBuilder::<f64>::default()
        .max_outer_iter(17)
        .constraint_tolerance(2.5e-4)
        .verbose(true)
        .build()
        .unwrap();

    let mut file = tempfile::tempfile().unwrap();
    settings.write_to_file(&mut file).unwrap();

    use std::io::{Seek, SeekFrom};
    file.seek(SeekFrom::Start(0)).unwrap();

    let read = DefaultSettings::<f64>::read_from_file(&mut file).unwrap();
    assert_eq!(read.max_outer_iter, 17);
    assert_eq!(read.constraint_tolerance, 2.5e-4);
    assert!(read.verbose);
}
