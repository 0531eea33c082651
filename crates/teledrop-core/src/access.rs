//! The Access Evaluator (§4.3).
//!
//! A pure, synchronous function deciding whether a caller may read a drop's
//! content. It is given an already-loaded [`Drop`] (or `None` if the slug
//! did not resolve) and an already-resolved [`AuthPrincipal`]; it never
//! touches the database or the Blob Store itself.

use crate::models::{AuthPrincipal, Decision, Drop};

/// Evaluate whether `caller` may read `drop`'s content, per §4.3's
/// five-rule decision table:
///
/// 1. No such drop → `DenyNotFound`.
/// 2. A private drop, caller is not its owner, caller is unauthenticated →
///    `DenyAuthRequired`.
/// 3. A private drop, caller is not its owner, caller is authenticated as
///    someone else → `DenyForbidden`.
/// 4. A passphrase-protected drop, caller is not its owner, no passphrase
///    supplied → `DenyPasswordRequired`.
/// 5. A passphrase-protected drop, caller is not its owner, a passphrase
///    was supplied but does not verify → `DenyPasswordInvalid`.
///
/// The owner may always read their own drop without a passphrase. Anyone
/// may read a public, passphrase-free drop.
pub fn evaluate(
    drop: Option<&Drop>,
    caller: &AuthPrincipal,
    supplied_passphrase: Option<&str>,
) -> Decision {
    let Some(drop) = drop else {
        return Decision::DenyNotFound;
    };

    if caller.owns(drop) {
        return Decision::Allow;
    }

    if drop.private {
        return if caller.is_authenticated() {
            Decision::DenyForbidden
        } else {
            Decision::DenyAuthRequired
        };
    }

    if let Some(hash) = &drop.passphrase_hash {
        return match supplied_passphrase {
            None => Decision::DenyPasswordRequired,
            Some(passphrase) => {
                if teledrop_crypto::verify_passphrase(passphrase, hash) {
                    Decision::Allow
                } else {
                    Decision::DenyPasswordInvalid
                }
            }
        };
    }

    Decision::Allow
}
