mod compilation_spec;
