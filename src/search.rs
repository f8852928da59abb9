//! Search orchestration: one search fans out the monograph and image
//! generations concurrently, waits for both to settle, and folds the
//! outcomes into a single state snapshot.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::warn;

use crate::entities::image::{self, ImageRef};
use crate::entities::monograph::{self, Monograph};
use crate::error::PharmographError;
use crate::sources::genai::GenAiClient;

pub(crate) const BLANK_INPUT_ERROR: &str = "Please enter a drug name.";
pub(crate) const CONTENT_FAILURE_ERROR: &str =
    "Failed to generate the drug monograph. Please check the drug name and try again.";

/// Everything the presentation layer needs, in one snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchState {
    pub monograph: Option<Monograph>,
    pub image: Option<ImageRef>,
    pub loading: bool,
    pub error: Option<String>,
    pub has_searched: bool,
}

/// One of the two generation calls a search fans out. How a failed branch
/// folds into the final state is a property of the branch, not of the call
/// site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Content,
    Image,
}

impl Branch {
    /// Whether a failure on this branch blocks the whole search.
    fn blocking(self) -> bool {
        match self {
            Branch::Content => true,
            Branch::Image => false,
        }
    }

    fn user_error(self) -> Option<&'static str> {
        self.blocking().then_some(CONTENT_FAILURE_ERROR)
    }
}

/// Owns the search state across consecutive (possibly overlapping)
/// searches. Each search takes a fresh generation number; a search whose
/// number is no longer current discards its result instead of overwriting
/// the state a newer search owns.
pub struct SearchSession {
    client: GenAiClient,
    generation: AtomicU64,
    state: Mutex<SearchState>,
}

impl SearchSession {
    pub fn new(client: GenAiClient) -> Self {
        Self {
            client,
            generation: AtomicU64::new(0),
            state: Mutex::new(SearchState::default()),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SearchState {
        self.state.lock().expect("state mutex poisoned").clone()
    }

    /// Runs one search to settlement and returns the resulting snapshot.
    ///
    /// Blank input is rejected on the spot: the error banner is set and no
    /// request leaves the process. Otherwise both generation calls run
    /// concurrently and `loading` stays up until the slower one settles,
    /// whatever its outcome.
    pub async fn search(&self, input: &str) -> SearchState {
        let drug_name = input.trim();
        if drug_name.is_empty() {
            let mut state = self.state.lock().expect("state mutex poisoned");
            state.error = Some(BLANK_INPUT_ERROR.to_string());
            return state.clone();
        }

        // Bumped under the lock so the pending reset is the newest
        // generation the instant it lands.
        let generation = {
            let mut state = self.state.lock().expect("state mutex poisoned");
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = SearchState {
                monograph: None,
                image: None,
                loading: true,
                error: None,
                has_searched: true,
            };
            generation
        };

        let (content, image) = tokio::join!(
            monograph::generate(&self.client, drug_name),
            image::generate(&self.client, drug_name),
        );

        let mut state = self.state.lock().expect("state mutex poisoned");
        if self.generation.load(Ordering::SeqCst) != generation {
            // A newer search owns the state; this result is stale.
            return state.clone();
        }
        *state = settle(drug_name, content, image);
        state.clone()
    }
}

/// Folds the two settled branch outcomes into the terminal state of a
/// search.
fn settle(
    drug_name: &str,
    content: Result<Monograph, PharmographError>,
    image: Result<ImageRef, PharmographError>,
) -> SearchState {
    let mut state = SearchState {
        monograph: None,
        image: None,
        loading: false,
        error: None,
        has_searched: true,
    };

    match content {
        Ok(monograph) => state.monograph = Some(monograph),
        Err(err) => branch_failed(&mut state, Branch::Content, drug_name, &err),
    }
    match image {
        Ok(image) => state.image = Some(image),
        Err(err) => branch_failed(&mut state, Branch::Image, drug_name, &err),
    }

    state
}

fn branch_failed(state: &mut SearchState, branch: Branch, drug_name: &str, err: &PharmographError) {
    warn!(drug = %drug_name, branch = ?branch, "generation branch failed: {err}");
    if let Some(message) = branch.user_error() {
        state.error = Some(message.to_string());
    }
}
