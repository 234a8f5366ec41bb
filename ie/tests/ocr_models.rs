use std::path::PathBuf;

use ie::{Ocr, OwnedImage, Rect, TextRecognizer};

fn model(name: &str) -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../ocr").join(name)
}

// Loads the real models from `<workspace>/ocr/`; run with:
// cargo test -p ie -- --ignored
#[test]
#[ignore = "needs ocr/detection.mnn, ocr/ch_recognition.mnn and ocr/ch_charset.txt"]
fn blank_label_reads_nothing() {
	let ocr = Ocr::try_new(
		model("detection.mnn"),
		model("ch_recognition.mnn"),
		model("ch_charset.txt"),
	)
	.unwrap();

	let img = OwnedImage::from_rgb_image(&image::RgbImage::from_pixel(120, 40, image::Rgb([20, 20, 20])));
	let texts = ocr.recognize(img.as_image(), Rect::new(10, 5, 80, 30), 0..=255);
	assert!(texts.iter().all(|t| t.text.trim().is_empty()), "{:?}", texts.iter().map(|t| &t.text).collect::<Vec<_>>());
}
