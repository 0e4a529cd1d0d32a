use eframe::egui::ecolor::Hsva;
use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

use crate::camera::{CameraPose, FAR_PLANE, FIELD_OF_VIEW_DEG, NEAR_PLANE, ViewBasis, view_basis};
use crate::geometry::Vec3;
use crate::market::UNCATEGORIZED;
use crate::util::stable_unit;

pub(super) const NEUTRAL_COLOR: Color32 = Color32::from_rgb(0x55, 0x55, 0x55);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * (0.35 + factor * 0.65)) as u8,
        (color.g() as f32 * (0.35 + factor * 0.65)) as u8,
        (color.b() as f32 * (0.35 + factor * 0.65)) as u8,
        (color.a() as f32 * factor) as u8,
    )
}

pub(super) fn category_color(category: &str) -> Color32 {
    match category {
        "Technology" => Color32::from_rgb(0x00, 0xf3, 0xff),
        "Finance" => Color32::from_rgb(0x00, 0xff, 0x9d),
        "Energy" => Color32::from_rgb(0xff, 0xae, 0x00),
        "Healthcare" | "Pharma" => Color32::from_rgb(0xff, 0x00, 0x55),
        "Consumer" | "Consumer Goods" => Color32::from_rgb(0xb3, 0x00, 0xff),
        "Industrial" | "Automotive" => Color32::from_rgb(0xff, 0x55, 0x00),
        "Materials" => Color32::from_rgb(0x00, 0xb8, 0xff),
        "Utilities" | "Infrastructure" => Color32::from_rgb(0x7a, 0x00, 0xff),
        "Real Estate" => Color32::from_rgb(0xff, 0x00, 0xaa),
        UNCATEGORIZED => NEUTRAL_COLOR,
        other => Hsva::new(stable_unit(other), 0.85, 1.0, 1.0).into(),
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(6, 8, 14));

    for index in 0..220u32 {
        let position = Pos2::new(
            rect.left() + stable_unit(&(index, 'x')) * rect.width(),
            rect.top() + stable_unit(&(index, 'y')) * rect.height(),
        );
        let alpha = (20.0 + stable_unit(&(index, 'a')) * 70.0) as u8;
        painter.circle_filled(position, 0.8, Color32::from_white_alpha(alpha));
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_stroke(width: f32, color: Color32, opacity: f32) -> Stroke {
    Stroke::new(width, color.gamma_multiply(opacity.clamp(0.0, 1.0)))
}

pub(super) struct Projection {
    position: Vec3,
    basis: ViewBasis,
    focal: f32,
    center: Pos2,
}

impl Projection {
    pub(super) fn new(pose: &CameraPose, rect: Rect) -> Self {
        let half_fov = FIELD_OF_VIEW_DEG.to_radians() * 0.5;
        Self {
            position: pose.position,
            basis: view_basis(pose),
            focal: (rect.height() * 0.5) / half_fov.tan(),
            center: rect.center(),
        }
    }

    /// Screen point, view depth and pixels per world unit at that depth.
    /// Points outside the near/far range are culled.
    pub(super) fn project(&self, world: Vec3) -> Option<(Pos2, f32, f32)> {
        let relative = world - self.position;
        let depth = relative.dot(self.basis.forward);
        if !(NEAR_PLANE..=FAR_PLANE).contains(&depth) {
            return None;
        }

        let scale = self.focal / depth;
        let x = relative.dot(self.basis.right) * scale;
        let y = relative.dot(self.basis.up) * scale;
        Some((Pos2::new(self.center.x + x, self.center.y - y), depth, scale))
    }
}
