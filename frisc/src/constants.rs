//! Constant values of the FRISC architecture.

/// Number of general purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// Register used as the stack pointer by `PUSH`, `POP`, `CALL` and `RET`.
pub const SP: usize = 7;

/// Size of a machine word, and of every instruction, in bytes.
pub const WORD_SIZE: u32 = 4;

/// Default size of the simulated memory, in bytes.
///
/// Generated programs initialise the stack pointer to the top
/// of this space.
pub const MEM_SIZE: usize = 0x40000; // 256 KiB

/// Number base of number literals without a base marker.
pub const DEFAULT_RADIX: u32 = 16;

/// Type for storing byte addresses.
pub type Address = u32;
