//! Filter for `oatdump` output.
//!
//! After the `OatDexFile:` header every line is offered to a fixed,
//! priority-ordered rule table:
//!
//! 1. instruction line, only while inside a method's `CODE:` region
//! 2. method header, only while inside a kept class
//! 3. class header, always
//!
//! The first rule whose guard holds and whose pattern matches handles the
//! line; lines no rule claims are dropped.

use kexp_core::log_debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::cursor::LineCursor;
use crate::patterns::{OAT_CLASS, OAT_INSTRUCTION, OAT_METHOD, dotted};
use crate::{FilterOptions, push_line};

const OAT_DEX_FILE: &str = "OatDexFile:";
const CODE_SECTION: &str = "CODE: ";

/// Scan state carried between lines.
#[derive(Debug, Default)]
struct OatState {
    inside_class: bool,
    inside_method: bool,
    first_method_in_class: bool,
    kept: usize,
    suppressed: usize,
}

/// What the driver loop must do after a rule fired.
enum Step {
    Continue,
    /// Skip to the method's `CODE:` line before resuming.
    SeekCode,
}

struct Rule {
    guard: fn(&OatState) -> bool,
    pattern: &'static Lazy<Regex>,
    apply: fn(&mut OatState, &Captures<'_>, &FilterOptions, &mut String) -> Step,
}

static RULES: [Rule; 3] = [
    Rule {
        guard: |state| state.inside_method,
        pattern: &OAT_INSTRUCTION,
        apply: emit_instruction,
    },
    Rule {
        guard: |state| state.inside_class,
        pattern: &OAT_METHOD,
        apply: begin_method,
    },
    Rule {
        guard: |_| true,
        pattern: &OAT_CLASS,
        apply: begin_class,
    },
];

fn emit_instruction(
    _state: &mut OatState,
    captures: &Captures<'_>,
    _options: &FilterOptions,
    out: &mut String,
) -> Step {
    push_line(out, &format!("        {}: {}", &captures[1], &captures[2]));
    Step::Continue
}

fn begin_method(
    state: &mut OatState,
    captures: &Captures<'_>,
    _options: &FilterOptions,
    out: &mut String,
) -> Step {
    if !state.first_method_in_class {
        out.push('\n');
    }
    state.first_method_in_class = false;
    state.inside_method = false;
    push_line(out, &format!("    {}", &captures[1]));
    Step::SeekCode
}

fn begin_class(
    state: &mut OatState,
    captures: &Captures<'_>,
    options: &FilterOptions,
    out: &mut String,
) -> Step {
    let class_name = dotted(&captures[1]);
    let suppressed = options.suppression.matches(&class_name);
    if suppressed {
        state.suppressed += 1;
    } else {
        state.kept += 1;
        push_line(out, &format!("class {class_name}"));
    }
    state.first_method_in_class = true;
    state.inside_class = !suppressed;
    state.inside_method = false;
    Step::Continue
}

/// Offer `line` to the rule table; `None` when no rule claims it.
fn dispatch(
    state: &mut OatState,
    line: &str,
    options: &FilterOptions,
    out: &mut String,
) -> Option<Step> {
    RULES.iter().find_map(|rule| {
        if !(rule.guard)(state) {
            return None;
        }
        let captures = rule.pattern.captures(line)?;
        Some((rule.apply)(state, &captures, options, out))
    })
}

/// Filter a complete `oatdump` listing.
pub fn filter_oat(dump: &str, options: &FilterOptions) -> String {
    filter_oat_lines(dump.lines(), options)
}

/// Filter an `oatdump` listing supplied line by line.
pub fn filter_oat_lines<I, S>(lines: I, options: &FilterOptions) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cursor = LineCursor::new(lines.into_iter());
    let mut out = String::new();

    if cursor
        .skip_past(|line| line.trim_start().starts_with(OAT_DEX_FILE))
        .is_none()
    {
        return out;
    }

    let mut state = OatState::default();
    while let Some(line) = cursor.advance() {
        match dispatch(&mut state, line.as_ref(), options, &mut out) {
            Some(Step::SeekCode) => {
                if cursor
                    .skip_past(|line| line.contains(CODE_SECTION))
                    .is_none()
                {
                    log_debug!("filter", "Method without CODE section, stopping");
                    break;
                }
                state.inside_method = true;
            }
            Some(Step::Continue) | None => {}
        }
    }

    log_debug!(
        "filter",
        kept = state.kept,
        suppressed = state.suppressed,
        lines = cursor.position(),
        "Filtered oatdump output"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "MAGIC:
oat
LOCATION:
/sdcard/classes.oat
OatDexFile:
location: /sdcard/classes.dex
checksum: 0x12345678
0: Lkotlin/Foo; (offset=0x00000580) (type_idx=1) (Initialized) (OatClassAllCompiled)
  0: void kotlin.Foo.foo() (dex_method_idx=0)
    DEX CODE:
      0x0000: 0e00                    \t| return-void
    OatMethodOffsets (offset=0x00000588)
      code_offset: 0x00001010
    CODE: (code_offset=0x00001010 size=4)...
      0x00001010: d65f03c0\tret
1: Lcom/example/Bar; (offset=0x00000590) (type_idx=2) (Initialized) (OatClassAllCompiled)
  0: void com.example.Bar.bar() (dex_method_idx=1)
    DEX CODE:
      0x0000: 0e00                    \t| return-void
    OatMethodOffsets (offset=0x00000598)
      code_offset: 0x00001020
    CODE: (code_offset=0x00001020 size=8)...
      0x00001020: d10043ff\tsub sp, sp, #0x10 (16)
      0x00001024: d65f03c0\tret
  1: int com.example.Bar.baz(int) (dex_method_idx=2)
    DEX CODE:
      0x0000: 0f01                    \t| return v1
    CODE: (code_offset=0x00001030 size=4)...
      0x00001030: 2a0103e0\tmov w0, w1
";

    const BAR: &str = "class com.example.Bar
    void com.example.Bar.bar()
        0x00001020: sub sp, sp, #0x10 (16)
        0x00001024: ret

    int com.example.Bar.baz(int)
        0x00001030: mov w0, w1
";

    #[test]
    fn keeps_user_classes_and_drops_runtime() {
        let output = filter_oat(DUMP, &FilterOptions::default());
        assert_eq!(output, BAR);
        assert!(!output.contains("kotlin.Foo"));
        assert!(!output.contains("0x00001010"));
    }

    #[test]
    fn first_method_has_no_leading_blank_line() {
        let output = filter_oat(DUMP, &FilterOptions::default());
        assert!(output.starts_with("class com.example.Bar\n    void com.example.Bar.bar()\n"));
        assert_eq!(output.matches("\n\n").count(), 1);
    }

    #[test]
    fn first_method_flag_resets_per_class() {
        let dump = "OatDexFile:
0: La/A; (offset=0x1) (type_idx=1)
  0: void a.A.one() (dex_method_idx=0)
    CODE: (code_offset=0x10 size=4)...
      0x00000010: d65f03c0\tret
  1: void a.A.two() (dex_method_idx=1)
    CODE: (code_offset=0x20 size=4)...
1: Lb/B; (offset=0x2) (type_idx=2)
  0: void b.B.three() (dex_method_idx=2)
    CODE: (code_offset=0x30 size=4)...
";
        let output = filter_oat(dump, &FilterOptions::default());
        assert_eq!(
            output,
            "class a.A\n    void a.A.one()\n        0x00000010: ret\n\n    void a.A.two()\nclass b.B\n    void b.B.three()\n"
        );
    }

    #[test]
    fn no_dex_file_header_means_empty_output() {
        assert_eq!(filter_oat("", &FilterOptions::default()), "");
        let without_header = DUMP.replace("OatDexFile:", "Something else:");
        assert_eq!(filter_oat(&without_header, &FilterOptions::default()), "");
    }

    #[test]
    fn missing_code_section_aborts_scan() {
        let dump = "OatDexFile:
0: Lcom/example/Bar; (offset=0x1) (type_idx=1)
  0: void com.example.Bar.bar() (dex_method_idx=0)
    DEX CODE:
      0x0000: 0e00 \t| return-void
1: Lcom/example/Baz; (offset=0x2) (type_idx=2)
";
        let output = filter_oat(dump, &FilterOptions::default());
        assert_eq!(output, "class com.example.Bar\n    void com.example.Bar.bar()\n");
    }

    #[test]
    fn suppressed_class_never_emits_methods() {
        let dump = "OatDexFile:
0: Lkotlin/Unit; (offset=0x1) (type_idx=1)
  0: void kotlin.Unit.<init>() (dex_method_idx=0)
    CODE: (code_offset=0x10 size=4)...
      0x00000010: d65f03c0\tret
";
        assert_eq!(filter_oat(dump, &FilterOptions::default()), "");
    }

    #[test]
    fn filtering_is_deterministic() {
        let options = FilterOptions::default();
        assert_eq!(filter_oat(DUMP, &options), filter_oat(DUMP, &options));
    }
}
