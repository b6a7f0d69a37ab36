use std::path::PathBuf;

use super::*;

fn tiny_layout() -> FieldLayout {
    FieldLayout {
        x_cells: 2,
        y_cells: 2,
        t_cells: 2,
        x_start: 0.0,
        x_end: 1.0,
        y_start: 0.0,
        y_end: 1.0,
        t_start: 0.0,
        t_end: 1.0,
    }
}

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("field_store_unit");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

fn write_floats(path: &Path, values: &[f32]) {
    let bytes = values
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect::<Vec<u8>>();
    std::fs::write(path, bytes).unwrap();
}

fn ramp(n: usize) -> Vec<f32> {
    (0..n).map(|i| i as f32).collect()
}

#[test]
fn scenario_two_by_two_by_two() {
    let path = scratch("ramp16.raw");
    write_floats(&path, &ramp(16));

    let field = FlowField::load(&path, tiny_layout(), LoadPolicy::Strict).unwrap();
    assert_eq!(field.report().status, LoadStatus::Complete);
    assert_eq!(field.vector_at(0, 0, 0).unwrap(), Vec2::new(0.0, 1.0));
    assert_eq!(field.vector_at(1, 1, 1).unwrap(), Vec2::new(14.0, 15.0));

    let s = field.slice(1).unwrap();
    assert_eq!(s.len(), 4);
    assert_eq!(
        s.as_floats(),
        &[8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0]
    );
    assert_eq!(s.get(0, 1).unwrap(), Vec2::new(10.0, 11.0));
    assert_eq!(s.row(1).unwrap(), &[[12.0, 13.0], [14.0, 15.0]]);
}

#[test]
fn layout_formula_round_trips_through_file() {
    let layout = FieldLayout {
        x_cells: 3,
        y_cells: 4,
        t_cells: 5,
        ..tiny_layout()
    };
    let reference = (0..layout.total_floats().unwrap())
        .map(|i| (i as f32) * 0.5 - 7.0)
        .collect::<Vec<_>>();
    let path = scratch("ramp_3x4x5.raw");
    write_floats(&path, &reference);

    let field = FlowField::load(&path, layout, LoadPolicy::Strict).unwrap();
    assert_eq!(field.as_floats(), reference.as_slice());
    for t in 0..5 {
        for y in 0..4 {
            for x in 0..3 {
                let base = 2 * (t * 4 * 3 + y * 3 + x);
                let v = field.vector_at(t, y, x).unwrap();
                assert_eq!(v, Vec2::new(reference[base], reference[base + 1]));
            }
        }
    }
}

#[test]
fn slice_and_point_lookup_agree() {
    let layout = FieldLayout {
        x_cells: 5,
        y_cells: 3,
        t_cells: 4,
        ..tiny_layout()
    };
    let n = layout.total_floats().unwrap();
    let field = FlowField::from_values(layout, ramp(n)).unwrap();
    for t in 0..layout.t_cells {
        let s = field.slice(t).unwrap();
        assert_eq!(s.len(), layout.y_cells * layout.x_cells);
        assert_eq!((s.width(), s.height()), (5, 3));
        for y in 0..layout.y_cells {
            for x in 0..layout.x_cells {
                assert_eq!(field.vector_at(t, y, x).unwrap(), s.get(y, x).unwrap());
            }
        }
    }
}

#[test]
fn out_of_range_names_axis() {
    let field = FlowField::from_values(tiny_layout(), ramp(16)).unwrap();
    assert!(matches!(
        field.slice(2),
        Err(FlowError::IndexOutOfRange { axis: "t", index: 2, bound: 2 })
    ));
    assert!(matches!(
        field.vector_at(0, 2, 0),
        Err(FlowError::IndexOutOfRange { axis: "y", .. })
    ));
    assert!(matches!(
        field.vector_at(0, 0, 7),
        Err(FlowError::IndexOutOfRange { axis: "x", index: 7, .. })
    ));
}

#[test]
fn lenient_empty_file_is_all_zero() {
    let path = scratch("empty.raw");
    std::fs::write(&path, b"").unwrap();

    let field = FlowField::load(&path, tiny_layout(), LoadPolicy::Lenient).unwrap();
    assert_eq!(field.report().status, LoadStatus::Truncated);
    assert_eq!(field.report().read_floats, 0);
    for t in 0..2 {
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(field.vector_at(t, y, x).unwrap(), Vec2::ZERO);
            }
        }
    }
}

#[test]
fn lenient_missing_file_is_all_zero() {
    let path = scratch("does_not_exist.raw");
    let _ = std::fs::remove_file(&path);

    let field = FlowField::load(&path, tiny_layout(), LoadPolicy::Lenient).unwrap();
    assert_eq!(field.report().status, LoadStatus::Missing);
    assert!(field.as_floats().iter().all(|v| *v == 0.0));
}

#[test]
fn lenient_short_file_keeps_prefix_and_zero_fills() {
    let path = scratch("short.raw");
    let mut bytes = ramp(5)
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect::<Vec<u8>>();
    // dangling partial float is dropped
    bytes.extend_from_slice(&[1, 2]);
    std::fs::write(&path, bytes).unwrap();

    let field = FlowField::load(&path, tiny_layout(), LoadPolicy::Lenient).unwrap();
    assert_eq!(field.report().read_floats, 5);
    assert_eq!(field.vector_at(0, 0, 0).unwrap(), Vec2::new(0.0, 1.0));
    assert_eq!(field.vector_at(0, 1, 0).unwrap(), Vec2::new(4.0, 0.0));
    assert_eq!(field.vector_at(1, 1, 1).unwrap(), Vec2::ZERO);
}

#[test]
fn strict_rejects_missing_and_short_files() {
    let missing = scratch("strict_missing.raw");
    let _ = std::fs::remove_file(&missing);
    assert!(matches!(
        FlowField::load(&missing, tiny_layout(), LoadPolicy::Strict),
        Err(FlowError::DataMissing { .. })
    ));

    let short = scratch("strict_short.raw");
    write_floats(&short, &ramp(10));
    assert!(matches!(
        FlowField::load(&short, tiny_layout(), LoadPolicy::Strict),
        Err(FlowError::DataTruncated {
            expected: 16,
            actual: 10
        })
    ));
}

#[test]
fn trailing_bytes_are_ignored() {
    let path = scratch("long.raw");
    write_floats(&path, &ramp(20));
    let field = FlowField::load(&path, tiny_layout(), LoadPolicy::Strict).unwrap();
    assert_eq!(field.as_floats().len(), 16);
    assert_eq!(field.report().read_floats, 16);
}

#[test]
fn from_values_rejects_wrong_length() {
    assert!(matches!(
        FlowField::from_values(tiny_layout(), ramp(15)),
        Err(FlowError::Validation(_))
    ));
}

struct Trickle<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn read_full_gathers_short_reads_and_stops_at_buffer_end() {
    let data = (0u8..10).collect::<Vec<_>>();
    let mut reader = Trickle {
        data: &data,
        chunk: 3,
    };
    let mut buf = [0xffu8; 8];
    assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 8);
    assert_eq!(buf, [0, 1, 2, 3, 4, 5, 6, 7]);

    let mut short = Trickle {
        data: &data[..5],
        chunk: 2,
    };
    let mut buf = [0u8; 8];
    assert_eq!(read_full(&mut short, &mut buf).unwrap(), 5);
    assert_eq!(&buf[5..], &[0, 0, 0]);
}
