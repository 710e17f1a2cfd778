mod import_manager_spec;
