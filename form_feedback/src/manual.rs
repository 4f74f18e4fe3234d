/*!

This is the long-form manual for `form_feedback` and `feedbackctl`.

## File formats

All the files are JSON documents, except for the CSV export.

### Form

```json
{
  "id": "7d5e8a1e-4a0f-4c55-9a83-3a1f0d6a2b11",
  "title": "Conference feedback",
  "description": "Two minutes, promised",
  "is_active": true,
  "questions": [
    { "id": 1, "text": "What was your favorite talk?", "question_type": "text",
      "is_required": true, "order": 0 },
    { "id": 2, "text": "Will you come back?", "question_type": "multiple_choice",
      "options": ["Yes", "No", "Maybe"], "is_required": false, "order": 1 }
  ]
}
```

- `question_type` is either `text` or `multiple_choice`.
- `options` is only read for `multiple_choice` questions. An empty list is accepted,
  but such a question can then only be left blank.
- `order` must be the position of the question in the list, starting at 0.
- `is_required` and `is_active` default to `true`.

### Responses

The responses file is a list of stored responses, in submission order:

```json
[
  { "id": 1, "form": "7d5e8a1e-4a0f-4c55-9a83-3a1f0d6a2b11",
    "submitted_at": "2024-03-01T09:30:00Z",
    "answers": [ { "question": 1, "answer_text": "The keynote" },
                 { "question": 2, "answer_text": "Yes" } ] }
]
```

### Submission

What a respondent sends. Answers to unknown questions are ignored, missing optional
answers are recorded as empty.

```json
{ "form": "7d5e8a1e-4a0f-4c55-9a83-3a1f0d6a2b11",
  "answers": [ { "question": 1, "answer_text": "The keynote" } ] }
```

## Validation rules

- a required question must have an answer that is not blank once trimmed
- the answer to a `multiple_choice` question must be exactly one of the options
  (case-sensitive, no trimming)
- the first failing question, in form order, is reported

## Summary

For each question, in form order:
- `multiple_choice`: the number of answers per option, in order of first appearance,
  with their percentage of all the answers rounded to one decimal. Empty answers are
  counted under `No Answer`.
- `text`: all the answers, in submission order, including the empty ones.

## CSV export

The columns are `Response ID`, `Submitted At` (RFC 3339, UTC) and then one column per
question, titled with the text of the question. Records end with CRLF. The default file
name is `responses.csv`.

## Configuration

`feedbackctl` accepts a JSON configuration file with the `--config` flag:

```json
{
  "formFile": "form.json",
  "responsesFile": "responses.json",
  "outputSettings": {
    "outputDirectory": "out",
    "csvFileName": "conference.csv",
    "numberedHeaders": false
  }
}
```

The paths are relative to the directory of the configuration file. The `--form` and
`--responses` flags override the corresponding entries.

*/
