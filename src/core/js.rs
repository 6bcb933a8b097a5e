//! Shared JS/TS module parsing on top of swc.
//!
//! Both the source-format locale parser and the namespace resolver need a
//! parsed module plus the ability to map swc spans back to byte offsets
//! and lines in the original text.

use anyhow::{Result, anyhow};
use swc_common::{BytePos, FileName, SourceMap, Span};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

pub struct ParsedModule {
    pub module: Module,
    pub source_map: SourceMap,
    start: BytePos,
}

impl ParsedModule {
    /// Byte offset of a position within the original source text.
    pub fn offset_of(&self, pos: BytePos) -> usize {
        pos.0.saturating_sub(self.start.0) as usize
    }

    /// Byte length of a span.
    pub fn span_len(&self, span: Span) -> usize {
        span.hi.0.saturating_sub(span.lo.0) as usize
    }

    /// 1-based line of a position.
    pub fn line_of(&self, pos: BytePos) -> usize {
        self.source_map.lookup_char_pos(pos).line
    }
}

/// Parse JS/TS/TSX source into an AST. TypeScript syntax with TSX enabled
/// covers every extension the scanner admits.
pub fn parse_module_source(code: &str, file_path: &str) -> Result<ParsedModule> {
    let source_map = SourceMap::default();
    let source_file =
        source_map.new_source_file(FileName::Real(file_path.into()).into(), code.to_string());

    let syntax = Syntax::Typescript(TsSyntax {
        tsx: true,
        ..Default::default()
    });
    let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);
    let module = parser
        .parse_module()
        .map_err(|e| anyhow!("Failed to parse module {}: {:?}", file_path, e))?;
    let start = source_file.start_pos;
    Ok(ParsedModule {
        module,
        source_map,
        start,
    })
}
