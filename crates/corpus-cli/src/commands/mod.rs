pub mod convert_ops;
