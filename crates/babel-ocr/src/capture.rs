use babel_core::CaptureError;
use babel_types::{Rect, ScreenRegion};
use xcap::Monitor;

/// Source of screen pixels for the primary display.
pub trait ScreenSource: Send + Sync {
    /// Usable area of the primary display; the overlay window covers exactly this.
    fn work_area(&self) -> Result<Rect, CaptureError>;

    /// Capture `region` (absolute screen coordinates) as PNG bytes.
    fn capture(&self, region: ScreenRegion) -> Result<Vec<u8>, CaptureError>;
}

/// Primary monitor through `xcap`.
#[derive(Debug, Clone, Default)]
pub struct XcapScreen {
    work_area: Option<Rect>,
}

impl XcapScreen {
    pub fn new(work_area: Option<Rect>) -> Self {
        Self { work_area }
    }

    /// Whole primary monitor as PNG.
    pub fn capture_full(&self) -> Result<Vec<u8>, CaptureError> {
        let monitor = primary_monitor()?;
        let image = monitor
            .capture_image()
            .map_err(|e| CaptureError::Capture(format!("Failed to capture screen: {e}")))?;
        encode_png(&image)
    }
}

impl ScreenSource for XcapScreen {
    fn work_area(&self) -> Result<Rect, CaptureError> {
        if let Some(area) = self.work_area {
            return Ok(area);
        }

        let monitor = primary_monitor()?;
        Ok(Rect::new(
            monitor.x(),
            monitor.y(),
            monitor.width() as i32,
            monitor.height() as i32,
        ))
    }

    fn capture(&self, region: ScreenRegion) -> Result<Vec<u8>, CaptureError> {
        if region.width == 0 || region.height == 0 {
            return Err(CaptureError::InvalidRegion(format!(
                "empty region {}x{}",
                region.width, region.height
            )));
        }

        let monitor = primary_monitor()?;
        let image = monitor
            .capture_image()
            .map_err(|e| CaptureError::Capture(format!("Failed to capture screen: {e}")))?;

        let (left, top) = crop_origin(
            region,
            monitor.x(),
            monitor.y(),
            image.width(),
            image.height(),
        )?;

        let cropped =
            xcap::image::imageops::crop_imm(&image, left, top, region.width, region.height)
                .to_image();

        tracing::debug!(
            width = cropped.width(),
            height = cropped.height(),
            "cropped capture region"
        );
        encode_png(&cropped)
    }
}

fn primary_monitor() -> Result<Monitor, CaptureError> {
    let monitors = Monitor::all()
        .map_err(|e| CaptureError::Capture(format!("Failed to get monitors: {e}")))?;
    pick_primary(monitors, Monitor::is_primary).ok_or(CaptureError::NoScreenSource)
}

/// The monitor flagged primary, else the first one listed.
fn pick_primary<M>(monitors: Vec<M>, is_primary: impl Fn(&M) -> bool) -> Option<M> {
    let index = monitors.iter().position(&is_primary).unwrap_or(0);
    monitors.into_iter().nth(index)
}

/// Position of `region` inside a bitmap of `width`x`height` whose top-left sits
/// at `(origin_x, origin_y)` on screen.
fn crop_origin(
    region: ScreenRegion,
    origin_x: i32,
    origin_y: i32,
    width: u32,
    height: u32,
) -> Result<(u32, u32), CaptureError> {
    let out_of_bounds = || CaptureError::OutOfBounds {
        region: format!(
            "{}x{}+{}+{}",
            region.width, region.height, region.x, region.y
        ),
        width,
        height,
    };

    let left = u32::try_from(i64::from(region.x) - i64::from(origin_x)).map_err(|_| out_of_bounds())?;
    let top = u32::try_from(i64::from(region.y) - i64::from(origin_y)).map_err(|_| out_of_bounds())?;

    let fits_x = left.checked_add(region.width).is_some_and(|right| right <= width);
    let fits_y = top.checked_add(region.height).is_some_and(|bottom| bottom <= height);
    if !fits_x || !fits_y {
        return Err(out_of_bounds());
    }

    Ok((left, top))
}

fn encode_png(image: &xcap::image::RgbaImage) -> Result<Vec<u8>, CaptureError> {
    use xcap::image::ImageEncoder;
    let mut buffer = Vec::new();
    xcap::image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            xcap::image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| CaptureError::Capture(format!("Failed to encode PNG: {e}")))?;
    Ok(buffer)
}
