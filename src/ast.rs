//! The public abstract syntax tree returned from [`crate::MarkdownParser::parse`].
//!
//! These types own their data outright (no arena indices, no back-references
//! to the parser) so callers can hold, move, and inspect them long after the
//! parser instance that produced them is gone.

/// Column alignment declared by a GFM table's delimiter row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Right,
    Center,
}

/// The kind of list and the marker it was opened with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListKind {
    Ordered { start: u64, delimiter: char },
    Unordered { marker: char },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    pub children: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableCell {
    pub align: Alignment,
    pub children: Vec<Inline>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub head: TableRow,
    pub body: Vec<TableRow>,
}

/// A block-level AST node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Paragraph { children: Vec<Inline> },
    Heading { level: u8, children: Vec<Inline> },
    CodeBlock { content: String, info: Option<String> },
    ThematicBreak,
    HtmlBlock { content: String },
    Blockquote { children: Vec<Block> },
    List { kind: ListKind, tight: bool, items: Vec<ListItem> },
    Table(Table),
}

/// An inline-level AST node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    Text { text: String },
    CodeSpan { text: String },
    SoftBreak,
    HardBreak,
    Html { content: String },
    Link { href: String, title: Option<String>, children: Vec<Inline> },
    Image { href: String, title: Option<String>, children: Vec<Inline> },
    Emphasis { children: Vec<Inline> },
    Strong { children: Vec<Inline> },
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_block(f, self, 0)
    }
}

impl std::fmt::Display for Inline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_inline(f, self)
    }
}

fn indent(f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
    for _ in 0..depth {
        write!(f, "  ")?;
    }
    Ok(())
}

fn write_block(f: &mut std::fmt::Formatter<'_>, block: &Block, depth: usize) -> std::fmt::Result {
    indent(f, depth)?;
    match block {
        Block::Paragraph { children } => {
            write!(f, "paragraph: ")?;
            write_inlines(f, children)?;
            writeln!(f)
        }
        Block::Heading { level, children } => {
            write!(f, "heading[{level}]: ")?;
            write_inlines(f, children)?;
            writeln!(f)
        }
        Block::CodeBlock { content, info } => {
            writeln!(f, "code_block[{}]: {} bytes", info.as_deref().unwrap_or(""), content.len())
        }
        Block::ThematicBreak => writeln!(f, "thematic_break"),
        Block::HtmlBlock { content } => writeln!(f, "html_block: {} bytes", content.len()),
        Block::Blockquote { children } => {
            writeln!(f, "blockquote")?;
            for child in children {
                write_block(f, child, depth + 1)?;
            }
            Ok(())
        }
        Block::List { kind, tight, items } => {
            writeln!(f, "list[{kind:?}, tight={tight}]")?;
            for item in items {
                indent(f, depth + 1)?;
                writeln!(f, "item")?;
                for child in &item.children {
                    write_block(f, child, depth + 2)?;
                }
            }
            Ok(())
        }
        Block::Table(table) => {
            writeln!(f, "table: {} columns, {} rows", table.head.cells.len(), table.body.len())
        }
    }
}

fn write_inlines(f: &mut std::fmt::Formatter<'_>, inlines: &[Inline]) -> std::fmt::Result {
    for (i, inline) in inlines.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write_inline(f, inline)?;
    }
    Ok(())
}

fn write_inline(f: &mut std::fmt::Formatter<'_>, inline: &Inline) -> std::fmt::Result {
    match inline {
        Inline::Text { text } => write!(f, "{text}"),
        Inline::CodeSpan { text } => write!(f, "`{text}`"),
        Inline::SoftBreak => write!(f, "\u{23ce}"),
        Inline::HardBreak => write!(f, "\u{23ce}\u{23ce}"),
        Inline::Html { content } => write!(f, "{content}"),
        Inline::Link { children, .. } => {
            write!(f, "[")?;
            write_inlines(f, children)?;
            write!(f, "]")
        }
        Inline::Image { children, .. } => {
            write!(f, "![")?;
            write_inlines(f, children)?;
            write!(f, "]")
        }
        Inline::Emphasis { children } => {
            write!(f, "*")?;
            write_inlines(f, children)?;
            write!(f, "*")
        }
        Inline::Strong { children } => {
            write!(f, "**")?;
            write_inlines(f, children)?;
            write!(f, "**")
        }
    }
}
