mod lru_tests;
