//! Control-flow block matching.
//!
//! Pairs opening, closing and partition keywords with a single stack pass
//! over the document's statements. The resulting [`BlockMap`] is shared by
//! the linter and by folding or bracket-highlighting hosts.

use crate::grammar::SyntaxTree;
use crate::mapper::CommandInfoMapper;
use seqlint_diagnostics::{LineIndex, Span};
use std::collections::BTreeMap;
use std::fmt;

/// A control-flow keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKeyword {
    /// `IF`
    If,
    /// `ELSE_IF`
    ElseIf,
    /// `ELSE`
    Else,
    /// `END_IF`
    EndIf,
    /// `WHILE`
    While,
    /// `END_WHILE`
    EndWhile,
    /// `FOR`
    For,
    /// `END_FOR`
    EndFor,
    /// `WAIT_UNTIL`
    WaitUntil,
    /// `WAIT_UNTIL_TIMEOUT`
    WaitUntilTimeout,
    /// `END_WAIT_UNTIL`
    EndWaitUntil,
}

impl BlockKeyword {
    /// Every keyword, in declaration order.
    pub const ALL: [BlockKeyword; 11] = [
        BlockKeyword::If,
        BlockKeyword::ElseIf,
        BlockKeyword::Else,
        BlockKeyword::EndIf,
        BlockKeyword::While,
        BlockKeyword::EndWhile,
        BlockKeyword::For,
        BlockKeyword::EndFor,
        BlockKeyword::WaitUntil,
        BlockKeyword::WaitUntilTimeout,
        BlockKeyword::EndWaitUntil,
    ];

    /// Parse a keyword (case-sensitive).
    pub fn from_keyword(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == text)
    }

    /// Source spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKeyword::If => "IF",
            BlockKeyword::ElseIf => "ELSE_IF",
            BlockKeyword::Else => "ELSE",
            BlockKeyword::EndIf => "END_IF",
            BlockKeyword::While => "WHILE",
            BlockKeyword::EndWhile => "END_WHILE",
            BlockKeyword::For => "FOR",
            BlockKeyword::EndFor => "END_FOR",
            BlockKeyword::WaitUntil => "WAIT_UNTIL",
            BlockKeyword::WaitUntilTimeout => "WAIT_UNTIL_TIMEOUT",
            BlockKeyword::EndWaitUntil => "END_WAIT_UNTIL",
        }
    }

    /// Whether this keyword starts a block.
    pub fn opens(self) -> bool {
        matches!(
            self,
            BlockKeyword::If
                | BlockKeyword::ElseIf
                | BlockKeyword::Else
                | BlockKeyword::While
                | BlockKeyword::For
                | BlockKeyword::WaitUntil
                | BlockKeyword::WaitUntilTimeout
        )
    }

    /// Whether this keyword ends a block.
    pub fn is_closing(self) -> bool {
        !matches!(
            self,
            BlockKeyword::If | BlockKeyword::While | BlockKeyword::For | BlockKeyword::WaitUntil
        )
    }

    /// Whether this keyword both closes a block and opens the next one.
    pub fn is_partition(self) -> bool {
        self.opens() && self.is_closing()
    }

    /// Whether this keyword closes a block opened by `open`.
    pub fn closes(self, open: BlockKeyword) -> bool {
        use BlockKeyword::*;
        match self {
            EndIf => matches!(open, If | ElseIf | Else),
            ElseIf | Else => matches!(open, If | ElseIf),
            EndWhile => open == While,
            EndFor => open == For,
            WaitUntilTimeout => open == WaitUntil,
            EndWaitUntil => matches!(open, WaitUntil | WaitUntilTimeout),
            If | While | For | WaitUntil => false,
        }
    }

    /// The keyword that terminates a block opened by `self`.
    pub fn terminator(self) -> BlockKeyword {
        match self {
            BlockKeyword::If | BlockKeyword::ElseIf | BlockKeyword::Else => BlockKeyword::EndIf,
            BlockKeyword::While => BlockKeyword::EndWhile,
            BlockKeyword::For => BlockKeyword::EndFor,
            BlockKeyword::WaitUntil | BlockKeyword::WaitUntilTimeout => BlockKeyword::EndWaitUntil,
            closing => closing,
        }
    }
}

impl fmt::Display for BlockKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a block pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEdge {
    /// Span of the whole statement.
    pub statement: Span,
    /// Fold position: end of the opening keyword, or start of the closing line.
    pub pos: usize,
}

/// A matched, dangling-open or dangling-close block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPairing {
    /// Keyword of the statement that created the entry.
    pub keyword: BlockKeyword,
    /// Opening side.
    pub start: Option<BlockEdge>,
    /// Closing side.
    pub end: Option<BlockEdge>,
}

impl BlockPairing {
    /// Both sides present.
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Opened but never closed.
    pub fn is_dangling_open(&self) -> bool {
        self.start.is_some() && self.end.is_none()
    }

    /// Closed without a matching opener.
    pub fn is_dangling_close(&self) -> bool {
        self.start.is_none() && self.end.is_some()
    }

    /// `(start.pos, end.pos)` of a complete pairing.
    pub fn fold_range(&self) -> Option<(usize, usize)> {
        Some((self.start?.pos, self.end?.pos))
    }
}

/// Pairings keyed by the start offset of the statement that created them.
pub type BlockMap = BTreeMap<usize, BlockPairing>;

/// Match control-flow statements in document order.
///
/// Partition keywords (`ELSE`, `ELSE_IF`, `WAIT_UNTIL_TIMEOUT`) close the
/// current block and open the next one in a single stack transition. A
/// partition that closes nothing still opens a block.
pub fn match_blocks(tree: &SyntaxTree, mapper: &dyn CommandInfoMapper) -> BlockMap {
    let line_index = LineIndex::new(tree.source());
    let mut map = BlockMap::new();
    let mut stack: Vec<(usize, BlockKeyword)> = Vec::new();

    for stmt in mapper.statements(tree) {
        let Some(keyword) = mapper.block_keyword(stmt) else {
            continue;
        };
        let key = stmt.from();
        if keyword.is_closing() {
            let end = BlockEdge {
                statement: stmt.span(),
                pos: line_index.line_start_of(stmt.from()),
            };
            match stack.last() {
                Some(&(open_key, open)) if keyword.closes(open) => {
                    stack.pop();
                    if let Some(pairing) = map.get_mut(&open_key) {
                        pairing.end = Some(end);
                    }
                }
                _ if !keyword.opens() => {
                    map.insert(
                        key,
                        BlockPairing {
                            keyword,
                            start: None,
                            end: Some(end),
                        },
                    );
                    continue;
                }
                _ => {}
            }
        }
        if keyword.opens() {
            let pos = mapper
                .block_keyword_node(stmt)
                .map_or(stmt.to(), |kw| kw.to());
            stack.push((key, keyword));
            map.insert(
                key,
                BlockPairing {
                    keyword,
                    start: Some(BlockEdge {
                        statement: stmt.span(),
                        pos,
                    }),
                    end: None,
                },
            );
        }
    }
    map
}
