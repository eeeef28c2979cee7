#![forbid(unsafe_code)]

/// A `for` loop usable in `const fn`s,
/// since normal `for` loops are not yet allowed in `const fn`s.
macro_rules! const_for {
    ($i:ident in $range:expr => $body:block) => {
        let mut $i = $range.start;
        #[allow(clippy::while_immutable_condition)]
        while $i < $range.end {
            $body
            $i += 1;
        }
    };
}

pub(crate) use const_for;
