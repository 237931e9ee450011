use crate::equal::deep_equal;
use crate::omit::{omit_tracked, OmitOptions};
use rdeep_common::{ObjectRef, Value};
use tracing::debug;

/// Deep equality after pruning both sides with the same options.
///
/// Each side is pruned independently (no cycle state is shared between the
/// two prunings) and the pruned copies are compared with [`deep_equal`].
/// With empty options this is exactly `deep_equal(a, b)`.
pub fn deep_equal_except(a: &Value, b: &Value, options: &OmitOptions<'_>) -> bool {
    if options.is_empty() {
        return deep_equal(a, b);
    }

    debug!(?options, "comparing with exclusions");
    let (left, left_copies) = omit_tracked(a, options);
    let _left_scratch = Scratch(left_copies);
    let (right, right_copies) = omit_tracked(b, options);
    let _right_scratch = Scratch(right_copies);

    deep_equal(&left, &right)
}

/// Containers private to one call, emptied on drop (normal return or
/// unwind) to release any cycles they reproduced.
struct Scratch(Vec<ObjectRef>);

impl Drop for Scratch {
    fn drop(&mut self) {
        for copy in &self.0 {
            copy.clear();
        }
    }
}
