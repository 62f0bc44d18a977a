//! QR code rendering for the contract address.

use egui::{Color32, Rect, Sense, Ui, Vec2};
use qrcode::{Color, QrCode};

/// Square grid of dark (`true`) and light modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    pub fn encode(data: &str) -> Result<Self, qrcode::types::QrError> {
        let code = QrCode::new(data.as_bytes())?;
        let width = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();
        Ok(Self { width, modules })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }
}

/// Paint `matrix` as a square of `size` points with a two-module quiet zone.
pub fn paint(ui: &mut Ui, matrix: &QrMatrix, size: f32) {
    let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 4.0, Color32::WHITE);

    let cells = matrix.width() + 4;
    let module = size / cells as f32;
    let origin = rect.min + Vec2::splat(2.0 * module);

    for y in 0..matrix.width() {
        for x in 0..matrix.width() {
            if matrix.is_dark(x, y) {
                let min = origin + Vec2::new(x as f32 * module, y as f32 * module);
                painter.rect_filled(
                    Rect::from_min_size(min, Vec2::splat(module)),
                    0.0,
                    Color32::BLACK,
                );
            }
        }
    }
}
