//! Bracket expression scanning.
//!
//! Inside `[...]` every byte except the closing `]` is literal. A leading
//! `^` negates the class, and `lo-hi` spans three positions read as one
//! inclusive range. A `-` that cannot start a range (first byte, or just
//! before `]`) is a plain member.

use smallvec::SmallVec;

use super::compiler::CompileError;

/// One member of a bracket expression, located by its pattern offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ClassItem {
    Byte { pos: usize, b: u8 },
    Range { pos: usize, lo: u8, hi: u8 },
}

impl ClassItem {
    pub(crate) fn pos(self) -> usize {
        match self {
            ClassItem::Byte { pos, .. } | ClassItem::Range { pos, .. } => pos,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ScannedClass {
    pub(crate) negated: bool,
    pub(crate) items: SmallVec<[ClassItem; 8]>,
    /// Offset of the closing `]`.
    pub(crate) close: usize,
}

/// Scans the bracket expression whose `[` is at `open`.
pub(crate) fn scan_class(re: &[u8], open: usize) -> Result<ScannedClass, CompileError> {
    let mut j = open + 1;
    let negated = re.get(j) == Some(&b'^');
    if negated {
        j += 1;
    }
    if re.get(j) == Some(&b']') {
        return Err(CompileError::EmptyClass { offset: open });
    }

    let mut items = SmallVec::new();
    loop {
        let lo = match re.get(j) {
            None => return Err(CompileError::UnbalancedClass { offset: open }),
            Some(b']') => break,
            Some(&b) => b,
        };
        match (re.get(j + 1), re.get(j + 2)) {
            (Some(b'-'), Some(&hi)) if hi != b']' => {
                if hi < lo {
                    return Err(CompileError::InvalidRange {
                        offset: j,
                        lo: char::from(lo),
                        hi: char::from(hi),
                    });
                }
                items.push(ClassItem::Range { pos: j, lo, hi });
                j += 3;
            }
            _ => {
                items.push(ClassItem::Byte { pos: j, b: lo });
                j += 1;
            }
        }
    }

    Ok(ScannedClass {
        negated,
        items,
        close: j,
    })
}
