use crate::error::AllocError;

pub const NODE_BLOCK_SIZE: usize = 512;
pub const ARC_BLOCK_SIZE: usize = 1024;

// Bump allocator over fixed-size blocks. Records are addressed by a global
// index (block * block_size + offset) and are never freed individually.
pub struct Arena<T> {
    kind: &'static str,
    block_size: usize,
    limit: usize,
    blocks: Vec<Vec<T>>,
    len: usize,
}

impl<T: Default> Arena<T> {
    pub fn new(kind: &'static str, block_size: usize) -> Self {
        Self::with_limit(kind, block_size, usize::MAX)
    }

    pub fn with_limit(kind: &'static str, block_size: usize, limit: usize) -> Self {
        Self { kind, block_size: block_size.max(1), limit, blocks: Vec::new(), len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    // return the index of the first of n contiguous records
    pub fn allocate(&mut self, n: usize) -> Result<usize, AllocError> {
        let error = AllocError { kind: self.kind, requested: n };
        if n == 0 || n > self.block_size {
            return Err(error);
        }

        let remaining = match self.blocks.last() {
            Some(block) => self.block_size - block.len(),
            None => 0,
        };
        // the tail of the current block stays unused so that the n records share one block
        let tail = if remaining < n { remaining } else { 0 };
        if self.len.saturating_add(tail).saturating_add(n) > self.limit {
            return Err(error);
        }
        if remaining < n {
            if let Some(block) = self.blocks.last_mut() {
                block.extend((0..tail).map(|_| T::default()));
                self.len += tail;
            }
            let mut block = Vec::new();
            block.try_reserve_exact(self.block_size).map_err(|_| error.clone())?;
            self.blocks.push(block);
        }

        let first = self.len;
        let Some(block) = self.blocks.last_mut() else {
            return Err(error);
        };
        block.extend((0..n).map(|_| T::default()));
        self.len += n;
        Ok(first)
    }

    #[inline]
    pub fn get(&self, index: usize) -> &T {
        &self.blocks[index / self.block_size][index % self.block_size]
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        &mut self.blocks[index / self.block_size][index % self.block_size]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(4, 1, 10, 3)]
    #[case(4, 2, 6, 3)]
    #[case(512, 1, 512, 1)]
    #[case(1024, 2, 513, 2)]
    fn allocate_grows_in_blocks(#[case] block_size: usize, #[case] n: usize, #[case] count: usize, #[case] expected_blocks: usize) {
        let mut arena: Arena<u32> = Arena::new("test", block_size);
        for i in 0..count {
            let first = arena.allocate(n).unwrap();
            assert_eq!(first, i * n);
            for k in 0..n {
                assert_eq!(*arena.get(first + k), 0);
            }
        }
        assert_eq!(arena.len(), count * n);
        assert_eq!(arena.num_blocks(), expected_blocks);
    }

    #[test]
    fn records_keep_contents_across_blocks() {
        let mut arena: Arena<usize> = Arena::new("test", 3);
        for i in 0..10 {
            let index = arena.allocate(1).unwrap();
            *arena.get_mut(index) = i * 7;
        }
        for i in 0..10 {
            assert_eq!(*arena.get(i), i * 7);
        }
    }

    #[test]
    fn pair_never_straddles_a_block() {
        let mut arena: Arena<u8> = Arena::new("test", 3);
        assert_eq!(arena.allocate(2).unwrap(), 0);
        // slot 2 is skipped
        assert_eq!(arena.allocate(2).unwrap(), 3);
        assert_eq!(arena.len(), 5);
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    fn rejects_bad_request(#[case] n: usize) {
        let mut arena: Arena<u8> = Arena::new("arc", 4);
        assert_eq!(arena.allocate(n), Err(AllocError { kind: "arc", requested: n }));
    }

    #[test]
    fn limit_is_enforced() {
        let mut arena: Arena<u8> = Arena::with_limit("node", 8, 3);
        for _ in 0..3 {
            arena.allocate(1).unwrap();
        }
        assert_eq!(arena.allocate(1), Err(AllocError { kind: "node", requested: 1 }));
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn padding_counts_against_the_limit() {
        let mut arena: Arena<u8> = Arena::with_limit("arc", 3, 4);
        assert_eq!(arena.allocate(2).unwrap(), 0);
        // the next pair would skip slot 2 and end at 5
        assert_eq!(arena.allocate(2), Err(AllocError { kind: "arc", requested: 2 }));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.allocate(1).unwrap(), 2);
    }
}
