mod lockout_tests;
