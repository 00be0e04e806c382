//! kexp disasm - condensed views of `dexdump` and `oatdump` output.
//!
//! Both filters are lossy, best-effort summarizers: they walk the dump
//! once, front to back, through a [`LineCursor`], keep what matches their
//! patterns and silently skip everything else. Classes from the Kotlin and
//! Java runtimes (see [`SuppressionPredicate`]) are dropped entirely.
//!
//! ```text
//!   dexdump -d ──► filter_dex ──► class com.example.Bar
//!                                     bar()V // com.example.Bar.bar()
//!                                         0000: return-void
//!
//!   oatdump    ──► filter_oat ──► class com.example.Bar
//!                                     void com.example.Bar.bar()
//!                                         0x00001010: ret
//! ```

pub mod cursor;
pub mod dex;
pub mod oat;
mod patterns;
pub mod suppression;

pub use cursor::LineCursor;
pub use dex::{filter_dex, filter_dex_lines};
pub use oat::{filter_oat, filter_oat_lines};
pub use suppression::{DEFAULT_SUPPRESSED_PREFIXES, SuppressionPredicate};

/// Knobs shared by both filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Classes hidden from the output.
    pub suppression: SuppressionPredicate,
    /// Keep extracting methods past the `Virtual methods` header of a
    /// `dexdump` class instead of treating it as the end of the class.
    pub include_virtual_methods: bool,
}

/// The two dump formats understood by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpKind {
    /// `dexdump -d` output.
    Dex,
    /// `oatdump` output.
    Oat,
}

impl DumpKind {
    /// Run the matching filter over a complete dump.
    pub fn filter(self, dump: &str, options: &FilterOptions) -> String {
        match self {
            DumpKind::Dex => filter_dex(dump, options),
            DumpKind::Oat => filter_oat(dump, options),
        }
    }
}

/// Append `text` and a newline.
fn push_line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}
