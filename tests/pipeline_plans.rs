mod common;

use std::path::PathBuf;

use media_slideshow::error::MediaLoadError;
use media_slideshow::media::MediaItem;
use media_slideshow::meta::Orientation;
use media_slideshow::pipeline::{
    ImageDecoder, PipelineFactory, PipelineOptions, PipelinePlan,
};
use tempfile::tempdir;

fn item(path: &str) -> MediaItem {
    MediaItem::from_path(path).expect("supported extension")
}

#[test]
fn graph_choice_follows_extension() {
    let factory = PipelineFactory::default();

    match factory.plan_with_orientation(&item("/m/a.JPG"), None) {
        PipelinePlan::Freeze { decoder, sink, .. } => {
            assert_eq!(decoder, ImageDecoder::Jpeg);
            assert_eq!(sink, "xvimagesink");
        }
        other => panic!("unexpected plan {other:?}"),
    }
    assert!(matches!(
        factory.plan_with_orientation(&item("/m/b.bmp"), None),
        PipelinePlan::Freeze {
            decoder: ImageDecoder::Generic,
            ..
        }
    ));
    assert_eq!(
        factory.plan_with_orientation(&item("/m/c.Avi"), None),
        PipelinePlan::AviMjpeg {
            path: PathBuf::from("/m/c.Avi")
        }
    );
    assert_eq!(
        factory.plan_with_orientation(&item("/m/d.mkv"), None),
        PipelinePlan::PlayBin {
            path: PathBuf::from("/m/d.mkv")
        }
    );
}

#[test]
fn freeze_description_applies_orientation_and_aspect() {
    let factory = PipelineFactory::default();
    let rotated = factory
        .plan_with_orientation(&item("/m/p.jpg"), Some(Orientation::Rotate90Cw))
        .launch_description()
        .unwrap();
    assert!(rotated.starts_with("filesrc location=\"/m/p.jpg\" ! jpegparse ! jpegdec"));
    assert!(rotated.contains("videoflip method=clockwise"));
    assert!(rotated.contains("imagefreeze"));
    assert!(rotated.ends_with("xvimagesink name=sink force-aspect-ratio=true"));

    let untagged = factory
        .plan_with_orientation(&item("/m/p.png"), None)
        .launch_description()
        .unwrap();
    assert!(untagged.contains("decodebin"));
    assert!(untagged.contains("videoflip method=automatic"));
}

#[test]
fn custom_sink_without_aspect_property() {
    let factory = PipelineFactory::new(PipelineOptions {
        image_sink: "autovideosink".into(),
    });
    let desc = factory
        .plan_with_orientation(&item("/m/p.gif"), None)
        .launch_description()
        .unwrap();
    assert!(desc.ends_with("autovideosink name=sink"));
    assert!(!desc.contains("force-aspect-ratio"));
}

#[test]
fn locations_are_quoted() {
    let factory = PipelineFactory::default();
    let desc = factory
        .plan_with_orientation(&item("/m/say \"hi\".avi"), None)
        .launch_description()
        .unwrap();
    assert!(desc.starts_with(r#"filesrc location="/m/say \"hi\".avi" ! avidemux ! jpegdec"#));

    let playbin = factory.plan_with_orientation(&item("/m/v.mp4"), None);
    assert_eq!(playbin.launch_description(), None);
    assert_eq!(playbin.label(), "playbin");
}

#[test]
fn plan_probes_images() {
    let tmp = tempdir().unwrap();
    let good = tmp.path().join("good.jpg");
    common::write_jpeg(&good);
    let bad = tmp.path().join("bad.png");
    std::fs::write(&bad, b"not a png").unwrap();

    let factory = PipelineFactory::default();
    match factory.plan(&item(good.to_str().unwrap())).unwrap() {
        PipelinePlan::Freeze { orientation, .. } => {
            assert_eq!(orientation, Some(Orientation::Rotate90Cw));
        }
        other => panic!("unexpected plan {other:?}"),
    }

    let err = factory.plan(&item(bad.to_str().unwrap())).unwrap_err();
    assert!(matches!(err, MediaLoadError::Probe { .. }), "got {err:?}");
}

#[test]
fn videos_are_planned_without_probing() {
    // The file does not exist; planning a video must not read it.
    let factory = PipelineFactory::default();
    let plan = factory.plan(&item("/nowhere/clip.mov")).unwrap();
    assert_eq!(plan.path(), PathBuf::from("/nowhere/clip.mov"));
}
