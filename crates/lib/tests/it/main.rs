/*! Integration tests for strata.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - doc: Tests for the Document tree, dotted-key operations and merge
 * - codec: Tests across the text/JSON/TOML codecs
 * - editor: Tests for the comment-preserving write cycle through a Store
 * - store: Tests for store construction, reload policy and typed accessors
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("strata=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod codec;
mod editor;
mod helpers;
mod store;
