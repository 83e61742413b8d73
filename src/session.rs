//! The authoritative in-memory session model.
//!
//! Everything presentation renders lives here: the append-only conversation
//! log, the detected and working ingredient lists, the displayed image, the
//! mode, and the busy flag. All mutation funnels through the methods on
//! [`SessionState`]; the gateway and the renderers only ever see values.

use tracing::debug;

use crate::ingredients::IngredientList;
use crate::types::{ConversationEntry, ImagePayload, SessionMode};

#[derive(Debug)]
pub struct SessionState {
    log: Vec<ConversationEntry>,
    /// Baseline from the last successful detection; `None` until one resolves.
    detected: Option<Vec<String>>,
    working: IngredientList,
    image: Option<ImagePayload>,
    mode: SessionMode,
    /// Outstanding gateway calls of any kind; drives the busy flag.
    in_flight: usize,
    detect_epoch: u64,
    detect_pending: bool,
    generate_epoch: u64,
    generate_pending: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            detected: None,
            working: IngredientList::new(),
            image: None,
            mode: SessionMode::AwaitingImage,
            in_flight: 0,
            detect_epoch: 0,
            detect_pending: false,
            generate_epoch: 0,
            generate_pending: false,
        }
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    pub fn log(&self) -> &[ConversationEntry] {
        &self.log
    }

    pub fn working_ingredients(&self) -> &IngredientList {
        &self.working
    }

    /// The read-only baseline from the last detection, if one has resolved.
    pub fn detected_ingredients(&self) -> Option<&[String]> {
        self.detected.as_deref()
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    /// True while any gateway call is outstanding. Independent of the mode;
    /// gates only the loading indicator and button disablement.
    pub fn busy(&self) -> bool {
        self.in_flight > 0
    }

    // ------------------------------------------------------------------
    // Mutation funnel
    // ------------------------------------------------------------------

    /// Append one entry to the conversation log. Entries are immutable once
    /// appended and keep insertion order.
    pub fn append_message(&mut self, entry: ConversationEntry) {
        self.log.push(entry);
    }

    /// Replace the working list wholesale, leaving the detected baseline
    /// untouched.
    pub fn replace_working_ingredients(&mut self, names: Vec<String>) {
        self.working.replace(names);
        self.guard_editable_mode();
    }

    /// Replace the displayed image wholesale.
    pub fn set_image(&mut self, image: ImagePayload) {
        self.image = Some(image);
    }

    pub fn set_mode(&mut self, mode: SessionMode) {
        if self.mode != mode {
            debug!(from = self.mode.as_str(), to = mode.as_str(), "mode transition");
            self.mode = mode;
        }
        self.guard_editable_mode();
    }

    pub fn edit_ingredient(&mut self, index: usize, text: String) {
        self.working.edit(index, text);
    }

    pub fn add_blank_ingredient(&mut self) {
        self.working.add_blank();
    }

    pub fn remove_ingredient(&mut self, index: usize) {
        self.working.remove(index);
        self.guard_editable_mode();
    }

    /// An editable mode with nothing to edit and no detection behind it is
    /// not a real state; fall back to awaiting an image.
    fn guard_editable_mode(&mut self) {
        if self.mode == SessionMode::IngredientsEditable
            && self.working.is_empty()
            && !self.detect_pending
            && self.detected.is_none()
        {
            debug!("editable mode without a detection behind it; reverting to awaiting_image");
            self.mode = SessionMode::AwaitingImage;
        }
    }

    // ------------------------------------------------------------------
    // Detection / generation bookkeeping (crate-internal)
    // ------------------------------------------------------------------

    /// Record a resolved detection: new baseline, working list replaced
    /// wholesale.
    pub(crate) fn record_detection(&mut self, names: Vec<String>) {
        self.working.replace(names.clone());
        self.detected = Some(names);
    }

    /// Mark a new detection call outstanding and return its epoch. A second
    /// begin while one is pending supersedes it: the earlier call's epoch
    /// goes stale and its result will be discarded.
    pub(crate) fn begin_detection(&mut self) -> u64 {
        self.in_flight += 1;
        self.detect_epoch += 1;
        self.detect_pending = true;
        self.detect_epoch
    }

    /// Settle a detection call. Returns true when the result is current and
    /// should be applied; a stale or already-settled epoch returns false.
    /// Always decrements the in-flight count: the call did complete.
    pub(crate) fn finish_detection(&mut self, epoch: u64) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.detect_pending && epoch == self.detect_epoch {
            self.detect_pending = false;
            true
        } else {
            false
        }
    }

    pub(crate) fn begin_generation(&mut self) -> u64 {
        self.in_flight += 1;
        self.generate_epoch += 1;
        self.generate_pending = true;
        self.generate_epoch
    }

    pub(crate) fn finish_generation(&mut self, epoch: u64) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.generate_pending && epoch == self.generate_epoch {
            self.generate_pending = false;
            true
        } else {
            false
        }
    }

    /// Chat queries are unrestricted: no epoch, just the busy count.
    pub(crate) fn begin_query(&mut self) {
        self.in_flight += 1;
    }

    pub(crate) fn finish_query(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}
