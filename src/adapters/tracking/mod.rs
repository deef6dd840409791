pub mod memory_unit_of_work;
