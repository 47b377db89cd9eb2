use std::{
    fs,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread,
};

use anyhow::Context;
use eframe::egui::ColorImage;

/// Covers larger than this on either side are downscaled before upload.
pub const MAX_COVER_SIDE: u32 = 1024;

pub fn decode_cover_image(bytes: &[u8]) -> anyhow::Result<ColorImage> {
    let mut image = image::load_from_memory(bytes).context("Failed to decode cover image")?;
    if image.width() > MAX_COVER_SIDE || image.height() > MAX_COVER_SIDE {
        image = image.thumbnail(MAX_COVER_SIDE, MAX_COVER_SIDE);
    }
    let image = image.to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    let pixels = image.into_raw();
    Ok(ColorImage::from_rgba_unmultiplied(size, &pixels))
}

pub fn load_cover_image(path: &Path) -> anyhow::Result<ColorImage> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read cover image: {}", path.display()))?;
    decode_cover_image(&bytes).with_context(|| format!("Cover image: {}", path.display()))
}

pub struct CoverMessage {
    pub request_id: u64,
    pub path: PathBuf,
    pub result: Result<ColorImage, String>,
}

/// Decodes cover art off the UI thread. Only the latest request is kept;
/// anything older that arrives afterwards is dropped.
pub struct CoverLoader {
    tx: Sender<CoverMessage>,
    rx: Receiver<CoverMessage>,
    next_request_id: u64,
    inflight_request: Option<u64>,
}

impl Default for CoverLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            next_request_id: 1,
            inflight_request: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.inflight_request.is_some()
    }

    pub fn request(&mut self, path: PathBuf) -> u64 {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.inflight_request = Some(request_id);

        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = load_cover_image(&path).map_err(|err| format!("{err:#}"));
            let _ = tx.send(CoverMessage {
                request_id,
                path,
                result,
            });
        });

        request_id
    }

    /// Forgets the in-flight request so its result will be ignored.
    pub fn cancel(&mut self) {
        self.inflight_request = None;
    }

    pub fn try_recv(&mut self) -> Option<CoverMessage> {
        loop {
            match self.rx.try_recv() {
                Ok(message) => {
                    if self.inflight_request == Some(message.request_id) {
                        self.inflight_request = None;
                        return Some(message);
                    }
                    log::debug!(
                        "Dropping stale cover result for {}",
                        message.path.display()
                    );
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    #[cfg(test)]
    fn inject(&self, message: CoverMessage) {
        let _ = self.tx.send(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io::Cursor,
        time::{Duration, Instant},
    };

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn wait_for(loader: &mut CoverLoader) -> Option<CoverMessage> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(message) = loader.try_recv() {
                return Some(message);
            }
            thread::sleep(Duration::from_millis(10));
        }
        None
    }

    #[test]
    fn decode_cover_image_fails_on_garbage_input() {
        assert!(decode_cover_image(&[0u8, 1u8, 2u8, 3u8]).is_err());
    }

    #[test]
    fn decode_cover_image_reads_png() {
        let image = decode_cover_image(&png_bytes(3, 2)).unwrap();
        assert_eq!(image.size, [3, 2]);
    }

    #[test]
    fn oversized_covers_are_downscaled() {
        let image = decode_cover_image(&png_bytes(2048, 1024)).unwrap();
        assert_eq!(image.size, [1024, 512]);
    }

    #[test]
    fn loader_delivers_decoded_cover() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        fs::write(&path, png_bytes(4, 4)).unwrap();

        let mut loader = CoverLoader::new();
        let id = loader.request(path.clone());
        let message = wait_for(&mut loader).expect("cover result");
        assert_eq!(message.request_id, id);
        assert_eq!(message.path, path);
        assert_eq!(message.result.unwrap().size, [4, 4]);
        assert!(!loader.is_loading());
    }

    #[test]
    fn loader_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = CoverLoader::new();
        loader.request(dir.path().join("missing.png"));
        let message = wait_for(&mut loader).expect("cover result");
        assert!(message.result.unwrap_err().contains("missing.png"));
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut loader = CoverLoader::new();
        loader.inflight_request = Some(7);
        loader.inject(CoverMessage {
            request_id: 6,
            path: PathBuf::from("old.png"),
            result: Err("old".into()),
        });
        assert!(loader.try_recv().is_none());
        assert!(loader.is_loading());

        loader.inject(CoverMessage {
            request_id: 7,
            path: PathBuf::from("new.png"),
            result: Err("new".into()),
        });
        let message = loader.try_recv().unwrap();
        assert_eq!(message.path, PathBuf::from("new.png"));
    }
}
