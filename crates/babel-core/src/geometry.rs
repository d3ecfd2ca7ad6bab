//! Overlay-local to absolute screen coordinates.
//!
//! The overlay window is placed on the primary display's work area, so its
//! origin is the work-area origin and not necessarily `(0, 0)`.

use babel_types::{CaptureRegion, Rect, ScreenRegion};

use crate::error::CaptureError;

/// Translate a user-drawn region by the work-area origin.
pub fn to_screen(region: CaptureRegion, work_area: Rect) -> Result<ScreenRegion, CaptureError> {
    if region.width < 0 || region.height < 0 {
        return Err(CaptureError::InvalidRegion(format!(
            "negative size {}x{}",
            region.width, region.height
        )));
    }

    let x = region
        .x
        .checked_add(work_area.x)
        .ok_or_else(|| CaptureError::InvalidRegion(format!("x overflow at {}", region.x)))?;
    let y = region
        .y
        .checked_add(work_area.y)
        .ok_or_else(|| CaptureError::InvalidRegion(format!("y overflow at {}", region.y)))?;

    Ok(ScreenRegion {
        x,
        y,
        width: region.width as u32,
        height: region.height as u32,
    })
}

/// Inverse of [`to_screen`].
pub fn to_capture(region: ScreenRegion, work_area: Rect) -> Result<CaptureRegion, CaptureError> {
    let width = i32::try_from(region.width)
        .map_err(|_| CaptureError::InvalidRegion(format!("width {} too large", region.width)))?;
    let height = i32::try_from(region.height)
        .map_err(|_| CaptureError::InvalidRegion(format!("height {} too large", region.height)))?;

    let x = region
        .x
        .checked_sub(work_area.x)
        .ok_or_else(|| CaptureError::InvalidRegion(format!("x underflow at {}", region.x)))?;
    let y = region
        .y
        .checked_sub(work_area.y)
        .ok_or_else(|| CaptureError::InvalidRegion(format!("y underflow at {}", region.y)))?;

    Ok(CaptureRegion {
        x,
        y,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: i32, y: i32, width: i32, height: i32) -> CaptureRegion {
        CaptureRegion {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn origin_work_area_is_identity() {
        let screen = to_screen(region(10, 20, 100, 50), Rect::new(0, 0, 1920, 1080)).unwrap();
        assert_eq!(
            screen,
            ScreenRegion {
                x: 10,
                y: 20,
                width: 100,
                height: 50
            }
        );
    }

    #[test]
    fn offsets_by_work_area_origin() {
        // Taskbar on the left, menu bar on top
        let work_area = Rect::new(64, 25, 1856, 1055);
        let screen = to_screen(region(10, 20, 100, 50), work_area).unwrap();
        assert_eq!((screen.x, screen.y), (74, 45));
        assert_eq!((screen.width, screen.height), (100, 50));
    }

    #[test]
    fn inverse_recovers_region() {
        let work_areas = [
            Rect::new(0, 0, 800, 600),
            Rect::new(64, 25, 1856, 1055),
            Rect::new(-1920, 0, 1920, 1080),
        ];
        let regions = [region(0, 0, 0, 0), region(10, 20, 100, 50), region(-5, 7, 1, 1)];

        for work_area in work_areas {
            for r in regions {
                let screen = to_screen(r, work_area).unwrap();
                assert_eq!(to_capture(screen, work_area).unwrap(), r);
            }
        }
    }

    #[test]
    fn rejects_negative_size() {
        let work_area = Rect::new(0, 0, 800, 600);
        assert!(matches!(
            to_screen(region(0, 0, -1, 10), work_area),
            Err(CaptureError::InvalidRegion(_))
        ));
        assert!(matches!(
            to_screen(region(0, 0, 10, -1), work_area),
            Err(CaptureError::InvalidRegion(_))
        ));
    }

    #[test]
    fn rejects_overflowing_origin() {
        let work_area = Rect::new(10, 0, 800, 600);
        assert!(to_screen(region(i32::MAX, 0, 1, 1), work_area).is_err());
    }
}
