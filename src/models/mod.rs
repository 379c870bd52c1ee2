pub mod rkey;
