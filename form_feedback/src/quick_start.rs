/*!

# Quick start

This example collects a few responses for a small form and looks at the results.

**Creating a form** Write the form in a file `form.json` (see the [manual](../manual/index.html#form)
for the format), or build it from code with the [builder](crate::builder::Builder).
Check that it is well formed:

```bash
feedbackctl check --form form.json
```

**Collecting responses** Each submission is a small JSON document. It is validated
against the form before being appended to the responses file:

```bash
feedbackctl submit --form form.json --responses responses.json --input submission.json
```

A submission that misses a required answer, or that picks an option that does not
exist, is rejected and nothing is written.

**Getting the results**

```bash
feedbackctl --verbose summary --form form.json --responses responses.json --out stdout
```

```text
[2024-03-01T09:55:59Z INFO  form_feedback] Processing 3 responses for form "Workshop" (...)
[2024-03-01T09:55:59Z INFO  form_feedback] Question 1: What did you learn? (3 answers)
[2024-03-01T09:55:59Z INFO  form_feedback] Question 2: Pick a track (3 answers)
[2024-03-01T09:55:59Z INFO  form_feedback]        2 A (66.7%)
[2024-03-01T09:55:59Z INFO  form_feedback]        1 B (33.3%)
```

**Exporting** The responses can be opened in any spreadsheet:

```bash
feedbackctl export --form form.json --responses responses.json --out responses.csv
```

*/
