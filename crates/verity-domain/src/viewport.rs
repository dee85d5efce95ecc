//! Viewport gate - decides whether an item is on screen

/// Axis-aligned rectangle in page coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top edge
    pub top: f64,
    /// Left edge
    pub left: f64,
    /// Right edge
    pub right: f64,
    /// Bottom edge
    pub bottom: f64,
}

impl Rect {
    /// Create a rectangle from its four edges
    pub fn new(top: f64, left: f64, right: f64, bottom: f64) -> Self {
        Self {
            top,
            left,
            right,
            bottom,
        }
    }

    /// Create a rectangle from its top-left corner and size
    pub fn from_origin(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(top, left, left + width, top + height)
    }

    /// The same rectangle shifted by `(dx, dy)`
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.top + dy, self.left + dx, self.right + dx, self.bottom + dy)
    }

    /// Overlap test; shared edges count as overlapping
    pub fn intersects(&self, other: &Rect) -> bool {
        self.top <= other.bottom
            && self.bottom >= other.top
            && self.left <= other.right
            && self.right >= other.left
    }
}

/// True iff the item's bounding rectangle overlaps the viewport
pub fn is_visible(item: &Rect, viewport: &Rect) -> bool {
    item.intersects(viewport)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn test_inside() {
        assert!(is_visible(&Rect::new(100.0, 100.0, 200.0, 200.0), &viewport()));
    }

    #[test]
    fn test_outside_each_side() {
        let vp = viewport();
        assert!(!is_visible(&Rect::new(-200.0, 100.0, 200.0, -1.0), &vp)); // above
        assert!(!is_visible(&Rect::new(801.0, 100.0, 200.0, 900.0), &vp)); // below
        assert!(!is_visible(&Rect::new(100.0, -300.0, -0.5, 200.0), &vp)); // left
        assert!(!is_visible(&Rect::new(100.0, 1000.5, 1200.0, 200.0), &vp)); // right
    }

    #[test]
    fn test_touching_edges_count() {
        let vp = viewport();
        assert!(is_visible(&Rect::new(800.0, 100.0, 200.0, 900.0), &vp));
        assert!(is_visible(&Rect::new(-100.0, 100.0, 200.0, 0.0), &vp));
        assert!(is_visible(&Rect::new(100.0, 1000.0, 1100.0, 200.0), &vp));
        assert!(is_visible(&Rect::new(100.0, -50.0, 0.0, 200.0), &vp));
    }

    #[test]
    fn test_partial_overlap() {
        assert!(is_visible(&Rect::new(750.0, 900.0, 1100.0, 850.0), &viewport()));
    }

    #[test]
    fn test_from_origin_and_translate() {
        let rect = Rect::from_origin(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect, Rect::new(20.0, 10.0, 110.0, 70.0));
        assert_eq!(rect.translate(0.0, -20.0), Rect::new(0.0, 10.0, 110.0, 50.0));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_rect() -> impl Strategy<Value = Rect> {
        (-1000.0f64..1000.0, -1000.0f64..1000.0, 0.0f64..500.0, 0.0f64..500.0)
            .prop_map(|(x, y, w, h)| Rect::from_origin(x, y, w, h))
    }

    proptest! {
        /// Property: overlap is symmetric
        #[test]
        fn test_overlap_symmetric(a in any_rect(), b in any_rect()) {
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        /// Property: a rectangle entirely below the viewport is never visible
        #[test]
        fn test_below_is_hidden(a in any_rect(), gap in 0.001f64..100.0) {
            let height = a.bottom - a.top;
            let below = Rect::new(a.bottom + gap, a.left, a.right, a.bottom + gap + height);
            prop_assert!(!is_visible(&below, &a));
        }
    }
}
