//! Filter for `dexdump -d` output.
//!
//! Emits one `class <name>` line per kept class, then for each method a
//! header of the form `    <name><type> // <class>.<name>()` followed by
//! the decoded instructions and a blank separator line.

use kexp_core::log_debug;

use crate::cursor::LineCursor;
use crate::patterns::{
    DEX_CLASS_DESCRIPTOR, DEX_INSTRUCTION, DEX_METADATA, DEX_METHOD_NAME, DEX_METHOD_START,
    DEX_METHOD_TYPE, capture, dotted, unknown,
};
use crate::{FilterOptions, push_line};

const CLASS_START: &str = "Class #";
const DIRECT_METHODS: &str = "Direct methods";
const VIRTUAL_METHODS: &str = "Virtual methods";
const INSTRUCTION_INDENT: &str = "        ";

/// How a line inside a method body is treated.
enum BodyLine<'a> {
    /// Decoded instruction text to re-emit.
    Instruction(&'a str),
    /// Property, catch or position line; skipped.
    Metadata,
    /// Anything else ends the body and is left for the caller.
    Boundary,
}

/// Classify a method-body line, instruction first, then method start,
/// then metadata.
fn classify_body_line(line: &str) -> BodyLine<'_> {
    if let Some(group) = DEX_INSTRUCTION
        .captures(line)
        .and_then(|captures| captures.get(1))
    {
        return BodyLine::Instruction(group.as_str());
    }
    if DEX_METHOD_START.is_match(line) {
        return BodyLine::Boundary;
    }
    if DEX_METADATA.is_match(line) {
        return BodyLine::Metadata;
    }
    BodyLine::Boundary
}

/// Filter a complete `dexdump -d` listing.
pub fn filter_dex(dump: &str, options: &FilterOptions) -> String {
    filter_dex_lines(dump.lines(), options)
}

/// Filter a `dexdump -d` listing supplied line by line.
pub fn filter_dex_lines<I, S>(lines: I, options: &FilterOptions) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cursor = LineCursor::new(lines.into_iter());
    let mut out = String::new();
    // Suppressed classes are still walked so the cursor lands on the next class.
    let mut discarded = String::new();
    let (mut kept, mut suppressed) = (0usize, 0usize);

    while cursor
        .skip_past(|line| line.starts_with(CLASS_START))
        .is_some()
    {
        let class_name = cursor
            .advance()
            .and_then(|line| capture(&DEX_CLASS_DESCRIPTOR, line.as_ref()))
            .map(|name| dotted(&name))
            .unwrap_or_else(unknown);

        let sink = if options.suppression.matches(&class_name) {
            suppressed += 1;
            discarded.clear();
            &mut discarded
        } else {
            kept += 1;
            push_line(&mut out, &format!("class {class_name}"));
            &mut out
        };

        if cursor
            .skip_past(|line| line.contains(DIRECT_METHODS))
            .is_none()
        {
            break;
        }
        extract_methods(&mut cursor, &class_name, options, sink);
    }

    log_debug!(
        "filter",
        kept,
        suppressed,
        lines = cursor.position(),
        "Filtered dexdump output"
    );
    out
}

/// Walk the method groups of one class.
fn extract_methods<I>(
    cursor: &mut LineCursor<I>,
    class_name: &str,
    options: &FilterOptions,
    out: &mut String,
) where
    I: Iterator,
    I::Item: AsRef<str>,
{
    while let Some(line) = cursor.peek() {
        if line.trim().is_empty() {
            cursor.advance();
        } else if DEX_METHOD_START.is_match(line) {
            cursor.advance();
            extract_method(cursor, class_name, out);
        } else if options.include_virtual_methods && line.contains(VIRTUAL_METHODS) {
            cursor.advance();
        } else {
            break;
        }
    }
}

/// Emit one method: header, instructions, blank separator.
///
/// The cursor sits just past the `#N` line on entry and on the first
/// unrecognized line on exit.
fn extract_method<I>(cursor: &mut LineCursor<I>, class_name: &str, out: &mut String)
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    let name = cursor
        .advance()
        .and_then(|line| capture(&DEX_METHOD_NAME, line.as_ref()))
        .unwrap_or_else(unknown);
    let signature = cursor
        .advance()
        .and_then(|line| capture(&DEX_METHOD_TYPE, line.as_ref()))
        .unwrap_or_else(unknown);

    push_line(
        out,
        &format!("    {name}{signature} // {class_name}.{name}()"),
    );

    while let Some(line) = cursor.peek() {
        match classify_body_line(line) {
            BodyLine::Instruction(text) => {
                out.push_str(INSTRUCTION_INDENT);
                push_line(out, text);
                cursor.advance();
            }
            BodyLine::Metadata => {
                cursor.advance();
            }
            BodyLine::Boundary => break,
        }
    }

    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SuppressionPredicate;

    const DUMP: &str = r#"Processing 'classes.dex'...
Opened 'classes.dex', DEX version '035'
Class #0            -
  Class descriptor  : 'Lkotlin/Foo;'
  Access flags      : 0x0011 (PUBLIC FINAL)
  Superclass        : 'Ljava/lang/Object;'
  Interfaces        -
  Static fields     -
  Instance fields   -
  Direct methods    -
    #0              : (in Lkotlin/Foo;)
      name          : 'foo'
      type          : '()V'
      access        : 0x0019 (PUBLIC STATIC FINAL)
      code          -
      registers     : 1
      ins           : 0
      outs          : 0
      insns size    : 1 16-bit code units
000144:                                        |[000144] kotlin.Foo.foo:()V
000154: 0e00                                   |0000: return-void
      catches       : (none)
      positions     :
        0x0000 line=3
      locals        :

  Virtual methods   -
  source_file_idx   : 1 (Foo.kt)

Class #1            -
  Class descriptor  : 'Lcom/example/Bar;'
  Access flags      : 0x0011 (PUBLIC FINAL)
  Superclass        : 'Ljava/lang/Object;'
  Interfaces        -
  Static fields     -
  Instance fields   -
  Direct methods    -
    #0              : (in Lcom/example/Bar;)
      name          : 'bar'
      type          : '()V'
      access        : 0x0019 (PUBLIC STATIC FINAL)
      code          -
      registers     : 1
      ins           : 0
      outs          : 0
      insns size    : 3 16-bit code units
000164:                                        |[000164] com.example.Bar.bar:()V
000174: 1a00 0100                              |0000: const-string v0, "hi" // string@0001
000178: 0e00                                   |0002: return-void
      catches       : (none)
      positions     :
        0x0000 line=5
      locals        :

    #1              : (in Lcom/example/Bar;)
      name          : 'baz'
      type          : '(I)I'
      access        : 0x0019 (PUBLIC STATIC FINAL)
      code          -
      registers     : 2
      ins           : 1
      outs          : 0
      insns size    : 1 16-bit code units
000180:                                        |[000180] com.example.Bar.baz:(I)I
000190: 0f01                                   |0000: return v1
      catches       : (none)
      positions     :
      locals        :

  Virtual methods   -
    #0              : (in Lcom/example/Bar;)
      name          : 'hidden'
      type          : '()V'
      access        : 0x0011 (PUBLIC FINAL)
      code          -
000200:                                        |[000200] com.example.Bar.hidden:()V
000210: 0e00                                   |0000: return-void
      catches       : (none)

  source_file_idx   : 2 (Bar.kt)
"#;

    const BAR_DIRECT: &str = "class com.example.Bar
    bar()V // com.example.Bar.bar()
        0000: const-string v0, \"hi\" // string@0001
        0002: return-void

    baz(I)I // com.example.Bar.baz()
        0000: return v1

";

    #[test]
    fn keeps_user_classes_and_drops_runtime() {
        let output = filter_dex(DUMP, &FilterOptions::default());
        assert_eq!(output, BAR_DIRECT);
        assert!(!output.contains("kotlin.Foo"));
        assert!(!output.contains("foo()V"));
    }

    #[test]
    fn virtual_methods_end_the_class_by_default() {
        let output = filter_dex(DUMP, &FilterOptions::default());
        assert!(!output.contains("hidden"));
    }

    #[test]
    fn virtual_methods_can_be_included() {
        let options = FilterOptions {
            include_virtual_methods: true,
            ..Default::default()
        };
        let output = filter_dex(DUMP, &options);
        let expected = format!(
            "{BAR_DIRECT}    hidden()V // com.example.Bar.hidden()\n        0000: return-void\n\n"
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn suppression_can_be_disabled() {
        let options = FilterOptions {
            suppression: SuppressionPredicate::none(),
            ..Default::default()
        };
        let output = filter_dex(DUMP, &options);
        assert!(output.starts_with("class kotlin.Foo\n    foo()V // kotlin.Foo.foo()\n"));
        assert_eq!(output.matches("class ").count(), 2);
    }

    #[test]
    fn one_class_line_per_kept_class_in_order() {
        let dump = "Class #0 -\n  Class descriptor  : 'La/First;'\n  Direct methods    -\n\
                    Class #1 -\n  Class descriptor  : 'Lkotlin/Unit;'\n  Direct methods    -\n\
                    Class #2 -\n  Class descriptor  : 'Lb/Second;'\n  Direct methods    -\n";
        let output = filter_dex(dump, &FilterOptions::default());
        assert_eq!(output, "class a.First\nclass b.Second\n");
    }

    #[test]
    fn unparseable_names_become_unknown() {
        let dump = "Class #0 -\n  Class descriptor  : ???\n  Direct methods    -\n    #0 : (in ?)\n      garbage\n      type          : '()V'\n";
        let output = filter_dex(dump, &FilterOptions::default());
        assert_eq!(
            output,
            "class <UNKNOWN>\n    <UNKNOWN>()V // <UNKNOWN>.<UNKNOWN>()\n\n"
        );
    }

    #[test]
    fn missing_sections_yield_partial_output() {
        assert_eq!(filter_dex("", &FilterOptions::default()), "");
        assert_eq!(
            filter_dex("Opened 'classes.dex'\nnothing here\n", &FilterOptions::default()),
            ""
        );
        // Class header without a method section: the class line is still emitted.
        let output = filter_dex(
            "Class #0 -\n  Class descriptor  : 'LMainKt;'\n",
            &FilterOptions::default(),
        );
        assert_eq!(output, "class MainKt\n");
    }

    #[test]
    fn filtering_is_deterministic() {
        let options = FilterOptions::default();
        assert_eq!(filter_dex(DUMP, &options), filter_dex(DUMP, &options));
    }

    #[test]
    fn accepts_owned_line_streams() {
        let lines: Vec<String> = DUMP.lines().map(str::to_string).collect();
        assert_eq!(
            filter_dex_lines(lines, &FilterOptions::default()),
            BAR_DIRECT
        );
    }
}
