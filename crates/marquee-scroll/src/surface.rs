//! The carousel track seam
//!
//! [`TrackSurface`] is the slice of the DOM the engine touches: the
//! scroller element and its item children.

pub trait TrackSurface: Send {
    /// Number of item children currently in the track
    fn item_count(&self) -> usize;

    /// Append a copy of every item (innerHTML += innerHTML)
    fn duplicate_items(&mut self);

    /// Total scrollable width of the track
    fn track_width(&self) -> f64;

    fn first_item_margin_right(&self) -> f64;

    fn first_item_height(&self) -> f64;

    /// Fix the track height and hide overflow; `None` removes the clipping
    fn set_clip_height(&mut self, height: Option<f64>);

    /// Collapse items to zero height, scaling from the bottom-right corner
    fn prepare_items(&mut self);

    fn set_items_scale_y(&mut self, scale: f64);

    /// Horizontal translation of the track in px
    fn set_offset(&mut self, x: f64);
}

/// In-memory track with fixed item widths
#[derive(Debug, Clone)]
pub struct HeadlessTrack {
    item_widths: Vec<f64>,
    margin_right: f64,
    item_height: f64,
    clip_height: Option<f64>,
    prepared: bool,
    scale_y: f64,
    offset: f64,
    offset_writes: usize,
}

impl HeadlessTrack {
    pub fn new(item_widths: Vec<f64>, margin_right: f64, item_height: f64) -> Self {
        Self {
            item_widths,
            margin_right,
            item_height,
            clip_height: None,
            prepared: false,
            scale_y: 1.0,
            offset: 0.0,
            offset_writes: 0,
        }
    }

    /// `count` cards of equal width
    pub fn uniform(count: usize, width: f64, margin_right: f64, item_height: f64) -> Self {
        Self::new(vec![width; count], margin_right, item_height)
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn offset_writes(&self) -> usize {
        self.offset_writes
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    pub fn clip_height(&self) -> Option<f64> {
        self.clip_height
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }
}

impl TrackSurface for HeadlessTrack {
    fn item_count(&self) -> usize {
        self.item_widths.len()
    }

    fn duplicate_items(&mut self) {
        self.item_widths.extend_from_within(..);
    }

    fn track_width(&self) -> f64 {
        self.item_widths.iter().map(|w| w + self.margin_right).sum()
    }

    fn first_item_margin_right(&self) -> f64 {
        if self.item_widths.is_empty() {
            0.0
        } else {
            self.margin_right
        }
    }

    fn first_item_height(&self) -> f64 {
        if self.item_widths.is_empty() {
            0.0
        } else {
            self.item_height
        }
    }

    fn set_clip_height(&mut self, height: Option<f64>) {
        self.clip_height = height;
    }

    fn prepare_items(&mut self) {
        self.prepared = true;
        self.scale_y = 0.0;
    }

    fn set_items_scale_y(&mut self, scale: f64) {
        self.scale_y = scale;
    }

    fn set_offset(&mut self, x: f64) {
        self.offset = x;
        self.offset_writes += 1;
    }
}
