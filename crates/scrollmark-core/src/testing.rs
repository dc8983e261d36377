use crate::layout::{LayoutSurface, Viewport};
use crate::runtime::ViewportControl;
use crate::sync::ProgressRecord;
use crate::transport::ProgressTransport;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub(crate) struct FakeSurface {
    pub panel_offsets: Vec<f32>,
    pub header: Option<f32>,
    pub viewport: Viewport,
}

impl FakeSurface {
    pub fn new(offsets: &[f32]) -> Self {
        Self {
            panel_offsets: offsets.to_vec(),
            header: None,
            viewport: Viewport {
                scroll_y: 0.0,
                height: 800.0,
                content_height: 20_000.0,
            },
        }
    }

    pub fn with_header(mut self, height: f32) -> Self {
        self.header = Some(height);
        self
    }
}

impl LayoutSurface for FakeSurface {
    fn panel_offsets(&self) -> Vec<f32> {
        self.panel_offsets.clone()
    }

    fn header_height(&self) -> Option<f32> {
        self.header
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

impl ViewportControl for FakeSurface {
    fn scroll_to(&mut self, y: f32) {
        self.viewport.scroll_y = y.max(0.0);
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingTransport {
    pub sent: Rc<RefCell<Vec<ProgressRecord>>>,
}

impl RecordingTransport {
    pub fn records(&self) -> Vec<ProgressRecord> {
        self.sent.borrow().clone()
    }
}

impl ProgressTransport for RecordingTransport {
    fn dispatch(&self, record: ProgressRecord) {
        self.sent.borrow_mut().push(record);
    }
}
