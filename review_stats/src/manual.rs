/*!

This is the long-form manual for `review_stats` and the `fleiss_kappa` / `select_papers` programs.

## Agreement between raters

`fleiss_kappa` reads a CSV file without a header. Each row is a subject (a paper), each column is
the vote of one rater:

```text
A,A,4
1,1,1
A,6,6
```

A vote is either `A` (the paper is accepted) or a number, which is the reason for rejecting the
paper. Two ways of counting are supported:

* multi-category (the default): every label is its own category. The labels are `A`, `1` to `6`
  unless other labels are given with `--categories`. A vote with another label is dropped with a
  warning, or stops the computation if `--strict` is passed.
* binary (`--binary`): all the numeric labels are merged into a single `Reject` category, and
  everything else counts as `Accept`.

The count matrix built from the example above (multi-category) is:

```text
         A  1  2  3  4  5  6
paper 1  2  0  0  0  1  0  0
paper 2  0  3  0  0  0  0  0
paper 3  1  0  0  0  0  0  2
```

Each subject must be rated by the same number of raters, and there must be at least two of them.
The agreement is undefined if all the votes fall in the same category. All these cases are
reported as errors.

Running:

```bash
fleiss_kappa round_2_scores.csv
fleiss_kappa -b round_2_scores.csv --out summary.json
```

## Selecting papers by rounds

`select_papers` reads the CSV file with all the candidate papers. The file has a header and a
column with the title of the paper (`Article` by default, see `--key-column`). The title is used
to identify a paper, so it must be unique.

Each invocation creates a new round: it looks for the files named `papers_round_<N>.csv` in the
same directory, removes all the papers already selected in these files, and draws a random subset
of the remaining papers (35 by default, see `--number`). The subset is written as
`papers_round_<N+1>.csv`, with the same columns as the input. Existing files are never modified.

```bash
select_papers data/all_papers.csv
select_papers -n 50 --seed 12 data/all_papers.csv
```

## Configuration file

Both programs accept `--config <file.json>`. Every field is optional, command line flags take
precedence:

```json
{
  "kappa": { "mode": "binary", "categories": ["A", "1", "2"], "unknownVotes": "reject" },
  "selection": { "number": 35, "seed": 7, "keyColumn": "Article" }
}
```

*/
