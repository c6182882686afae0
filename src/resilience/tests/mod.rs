mod circuit_breaker_tests;
