use super::*;
use crate::foundation::core::Fps;

fn solid(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: true,
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("png_sink").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn unpremultiply_restores_straight_color() {
    assert_eq!(unpremultiply_rgba8(&[128, 64, 0, 128]), vec![255, 128, 0, 128]);
    assert_eq!(unpremultiply_rgba8(&[5, 5, 5, 0]), vec![0, 0, 0, 0]);
    assert_eq!(unpremultiply_rgba8(&[10, 20, 30, 255]), vec![10, 20, 30, 255]);
}

#[test]
fn sequence_writes_numbered_files() {
    let dir = scratch_dir("sequence");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(SinkConfig {
        width: 4,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
    })
    .unwrap();
    sink.push_frame(FrameIndex(0), &solid(4, 2, [255, 0, 0, 255]))
        .unwrap();
    sink.push_frame(FrameIndex(1), &solid(4, 2, [0, 255, 0, 255]))
        .unwrap();
    assert!(
        sink.push_frame(FrameIndex(1), &solid(4, 2, [0, 0, 0, 255]))
            .is_err()
    );
    assert!(
        sink.push_frame(FrameIndex(2), &solid(2, 2, [0, 0, 0, 255]))
            .is_err()
    );
    sink.end().unwrap();

    assert_eq!(sink.written(), 2);
    let img = image::open(sink.frame_path(FrameIndex(1))).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (4, 2));
    assert_eq!(img.get_pixel(0, 0).0, [0, 255, 0, 255]);
}

#[test]
fn push_before_begin_fails() {
    let mut sink = PngSequenceSink::new(scratch_dir("unstarted"));
    assert!(
        sink.push_frame(FrameIndex(0), &solid(1, 1, [0, 0, 0, 255]))
            .is_err()
    );
}
