use super::{LayoutMode, Rect, Viewport};
use crate::config::LayoutConfig;

const REGION_INSET: f32 = 20.0;
const STACK_GAP: f32 = 40.0;

pub fn vpc_rect(viewport: Viewport, config: &LayoutConfig) -> Rect {
    Rect::new(
        config.margin,
        config.margin,
        (viewport.width - config.margin * 2.0).max(0.0),
        (viewport.height - config.margin * 2.0).max(0.0),
    )
}

/// Public and private region rectangles inside the VPC.
pub fn region_rects(vpc: &Rect, mode: LayoutMode) -> (Rect, Rect) {
    match mode {
        LayoutMode::Stacked => {
            let width = vpc.width * 0.85;
            let height = vpc.height * 0.4;
            let x = vpc.x + (vpc.width - width) / 2.0;
            (
                Rect::new(x, vpc.y + REGION_INSET, width, height),
                Rect::new(x, vpc.y + height + STACK_GAP, width, height),
            )
        }
        LayoutMode::SideBySide => {
            let width = vpc.width * 0.45;
            let height = vpc.height * 0.8;
            (
                Rect::new(vpc.x + REGION_INSET, vpc.y + REGION_INSET, width, height),
                Rect::new(vpc.right() - width - REGION_INSET, vpc.y + REGION_INSET, width, height),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_by_side_regions_split_the_vpc() {
        let vpc = vpc_rect(Viewport::new(1200.0, 800.0), &LayoutConfig::default());
        assert_eq!(vpc, Rect::new(40.0, 40.0, 1120.0, 720.0));
        let (public, private) = region_rects(&vpc, LayoutMode::SideBySide);
        assert_eq!((public.x, public.y), (60.0, 60.0));
        assert!((public.width - 504.0).abs() < 1e-3);
        assert!((public.height - 576.0).abs() < 1e-3);
        assert!((private.x - 636.0).abs() < 1e-3);
        assert!(public.right() < private.x);
    }

    #[test]
    fn stacked_regions_leave_a_gap() {
        let vpc = vpc_rect(Viewport::new(600.0, 800.0), &LayoutConfig::default());
        let (public, private) = region_rects(&vpc, LayoutMode::Stacked);
        assert_eq!(public.x, private.x);
        assert_eq!(public.width, private.width);
        assert!(private.y - public.bottom() >= 19.0);
    }
}
