mod core_spec;
