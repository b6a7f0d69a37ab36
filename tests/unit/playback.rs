use super::*;

#[test]
fn advance_wraps_at_last_step() {
    let mut f = ActiveFrame::new(3).unwrap();
    f.seek(2).unwrap();
    f.advance_time();
    assert_eq!(f.time_index(), 0);
}

#[test]
fn advance_has_period_t() {
    for t_cells in [1usize, 2, 7, 1001] {
        let mut f = ActiveFrame::new(t_cells).unwrap();
        f.seek(t_cells / 2).unwrap();
        let start = f.time_index();
        for _ in 0..t_cells {
            f.advance_time();
        }
        assert_eq!(f.time_index(), start);
    }
}

#[test]
fn sync_uploads_only_when_stale() {
    let mut f = ActiveFrame::new(4).unwrap();
    let mut uploads = Vec::new();

    assert!(f.sync(|t| {
        uploads.push(t);
        Ok(())
    })
    .unwrap());
    assert!(!f.sync(|t| {
        uploads.push(t);
        Ok(())
    })
    .unwrap());

    f.advance_time();
    assert!(f.is_stale());
    f.sync(|t| {
        uploads.push(t);
        Ok(())
    })
    .unwrap();

    assert_eq!(uploads, vec![0, 1]);
    assert_eq!(f.uploaded_index(), Some(f.time_index()));
}

#[test]
fn uploaded_matches_time_after_every_sync() {
    let mut f = ActiveFrame::new(5).unwrap();
    for step in 0..23 {
        if step % 3 != 0 {
            f.advance_time();
        }
        f.sync(|_| Ok(())).unwrap();
        assert_eq!(f.uploaded_index(), Some(f.time_index()));
        assert!(!f.is_stale());
    }
}

#[test]
fn failed_upload_stays_stale() {
    let mut f = ActiveFrame::new(2).unwrap();
    let err = f.sync(|_| Err(FlowError::gpu("lost device"))).unwrap_err();
    assert!(matches!(err, FlowError::Gpu(_)));
    assert!(f.is_stale());
    assert_eq!(f.uploaded_index(), None);
}

#[test]
fn invalidate_forces_reupload() {
    let mut f = ActiveFrame::new(2).unwrap();
    f.sync(|_| Ok(())).unwrap();
    f.invalidate();
    assert!(f.sync(|_| Ok(())).unwrap());
}

#[test]
fn rejects_empty_timeline_and_bad_seek() {
    assert!(ActiveFrame::new(0).is_err());
    let mut f = ActiveFrame::new(3).unwrap();
    assert!(matches!(
        f.seek(3),
        Err(FlowError::IndexOutOfRange { axis: "t", .. })
    ));
}
