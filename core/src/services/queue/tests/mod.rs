mod queue_tests;
