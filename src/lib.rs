mod cpu;
mod inst;
mod loader;
mod mem;
mod reg;

pub use cpu::{ExecutionError, State, UnknownOpcodePolicy, CPU};
pub use inst::{decode_inst, lookup_mnemonic, AluOp, Inst, OpCode, UnsupportedOperation, OPCODES};
pub use loader::{load_file, BinaryLoader, LoadError, Loader, MnemonicLoader, ProgramFormat};
pub use mem::{Memory, MemoryError, RAM, RAM_SIZE};
pub use reg::{RegisterError, Registers, REGISTER_CNT, SP, SP_INIT};
