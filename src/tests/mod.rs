mod test_greenhouse;
