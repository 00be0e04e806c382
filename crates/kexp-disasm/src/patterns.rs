//! Line patterns recognized by the dump filters.

use kexp_core::constants::UNKNOWN;
use once_cell::sync::Lazy;
use regex::Regex;

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("dump pattern must be a valid regex")
}

// dexdump -d

/// `  Class descriptor  : 'Lcom/example/Bar;'`
pub(crate) static DEX_CLASS_DESCRIPTOR: Lazy<Regex> =
    Lazy::new(|| pattern(r"Class descriptor\s*:\s*'L(.+);'"));

/// `    #0              : (in Lcom/example/Bar;)`
pub(crate) static DEX_METHOD_START: Lazy<Regex> = Lazy::new(|| pattern(r"^\s+#"));

/// `      name          : 'bar'`
pub(crate) static DEX_METHOD_NAME: Lazy<Regex> = Lazy::new(|| pattern(r"name\s*:\s*'(.+)'"));

/// `      type          : '()V'`
pub(crate) static DEX_METHOD_TYPE: Lazy<Regex> = Lazy::new(|| pattern(r"type\s*:\s*'(.+)'"));

/// `000154: 0e00                     |0000: return-void`, capturing `0000: return-void`.
pub(crate) static DEX_INSTRUCTION: Lazy<Regex> =
    Lazy::new(|| pattern(r"^[0-9a-fA-F]+:[^|]+\|([0-9a-fA-F]+: .+)$"));

/// Method properties, catch and position tables (indented four or more),
/// and the `000144: |[000144] Bar.bar:()V` code header.
pub(crate) static DEX_METADATA: Lazy<Regex> =
    Lazy::new(|| pattern(r"^(\s{4,}\S|[0-9a-fA-F]+:\s*\|\[)"));

// oatdump

/// `1: Lcom/example/Bar; (offset=0x00000590) (type_idx=2) (Initialized) ...`
pub(crate) static OAT_CLASS: Lazy<Regex> = Lazy::new(|| {
    pattern(r"^\d+: L([^;]+); \(offset=0x[0-9a-fA-F]+\) \(type_idx=\d+\)")
});

/// `  0: void com.example.Bar.bar() (dex_method_idx=1)`
pub(crate) static OAT_METHOD: Lazy<Regex> =
    Lazy::new(|| pattern(r"^\s+\d+:\s+(.+?)\s+\(dex_method_idx=\d+\)"));

/// `      0x00001010: d65f03c0	ret`
pub(crate) static OAT_INSTRUCTION: Lazy<Regex> =
    Lazy::new(|| pattern(r"^\s+(0x[0-9a-fA-F]+):\s+[0-9a-fA-F]+\s+(.+)$"));

/// First capture group of `regex` in `line`, if any.
pub(crate) fn capture(regex: &Regex, line: &str) -> Option<String> {
    regex
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str().to_string())
}

/// JVM internal name to dotted form: `com/example/Bar` -> `com.example.Bar`.
pub(crate) fn dotted(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}

pub(crate) fn unknown() -> String {
    UNKNOWN.to_string()
}
