//! embedded-graphics integration.
//!
//! A [`Drawbuffer`] is a `DrawTarget<Color = Rgb888>`, so text, primitives
//! and images from the embedded-graphics ecosystem render straight into it
//! in whatever pixel format the buffer uses. Colors arrive opaque.

use embedded_graphics::pixelcolor::{Gray8, GrayColor, Rgb565, Rgb888, RgbColor};
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Size};
use embedded_graphics::primitives::Rectangle;

use crate::drawbuffer::Drawbuffer;
use crate::pixel::Pixel;

impl From<Rgb888> for Pixel {
    fn from(c: Rgb888) -> Self {
        Self::rgb(c.r(), c.g(), c.b())
    }
}

/// Channels are shifted up, matching how the RGB565 codec decodes.
impl From<Rgb565> for Pixel {
    #[allow(clippy::arithmetic_side_effects)]
    fn from(c: Rgb565) -> Self {
        Self::rgb(c.r() << 3, c.g() << 2, c.b() << 3)
    }
}

impl From<Gray8> for Pixel {
    fn from(c: Gray8) -> Self {
        let v = c.luma();
        Self::rgb(v, v, v)
    }
}

impl Pixel {
    /// Color channels as an embedded-graphics color; alpha is dropped.
    pub fn to_rgb888(self) -> Rgb888 {
        Rgb888::new(self.r, self.g, self.b)
    }
}

impl From<Pixel> for Rgb888 {
    fn from(p: Pixel) -> Self {
        p.to_rgb888()
    }
}

impl DrawTarget for Drawbuffer {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for embedded_graphics::Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, Pixel::from(color));
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let w = i32::try_from(area.size.width).unwrap_or(i32::MAX);
        let h = i32::try_from(area.size.height).unwrap_or(i32::MAX);
        self.rectangle(
            area.top_left.x,
            area.top_left.y,
            w,
            h,
            Pixel::from(color),
            crate::Shape::Fill,
            crate::DrawMode::Opaque,
        );
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        Drawbuffer::clear(self, Pixel::from(color));
        Ok(())
    }
}

impl OriginDimensions for Drawbuffer {
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}
